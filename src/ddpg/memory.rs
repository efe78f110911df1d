use crate::matrix::Matrix;

/// Ring buffer of past transitions. Each row packs one tuple as
/// `2 * state + action + 2` doubles:
///
/// ```text
/// [ 0 .. S )            previous state
/// [ S .. S+A )          action
/// [ S+A ]               reward
/// [ S+A+1 .. 2S+A+1 )   next state
/// [ 2S+A+1 ]            terminal flag (0.0 or 1.0)
/// ```
///
/// Once full, the slot at the current write index holds the oldest record
/// and is the next to be overwritten.
#[derive(Clone, Debug)]
pub struct ReplayMemory {
    data: Matrix,
    capacity: usize,
    used: usize,
    idx: usize,
    state_size: usize,
    action_size: usize,
}

impl ReplayMemory {
    pub(crate) fn new(capacity: usize, state_size: usize, action_size: usize) -> Self {
        Self {
            data: Matrix::new(capacity, 2 * state_size + action_size + 2),
            capacity,
            used: 0,
            idx: 0,
            state_size,
            action_size,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of filled slots, at most the capacity.
    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// The slot the next `record` will write.
    pub fn write_index(&self) -> usize {
        self.idx
    }

    pub fn row(&self, index: usize) -> &[f64] {
        self.data.row(index)
    }

    pub fn prev_state(&self, index: usize) -> &[f64] {
        &self.row(index)[..self.state_size]
    }

    pub fn action(&self, index: usize) -> &[f64] {
        &self.row(index)[self.state_size..self.state_size + self.action_size]
    }

    pub fn reward(&self, index: usize) -> f64 {
        self.row(index)[self.state_size + self.action_size]
    }

    pub fn next_state(&self, index: usize) -> &[f64] {
        let start = self.state_size + self.action_size + 1;
        &self.row(index)[start..start + self.state_size]
    }

    pub fn terminal(&self, index: usize) -> bool {
        self.row(index)[2 * self.state_size + self.action_size + 1] > 0.0
    }

    pub(crate) fn record(
        &mut self,
        prev_state: &[f64],
        action: &[f64],
        reward: f64,
        next_state: &[f64],
        terminal: bool,
    ) {
        let s = self.state_size;
        let a = self.action_size;
        let idx = self.idx;

        let row = self.data.row_mut(idx);
        row[..s].copy_from_slice(prev_state);
        row[s..s + a].copy_from_slice(action);
        row[s + a] = reward;
        row[s + a + 1..2 * s + a + 1].copy_from_slice(next_state);
        row[2 * s + a + 1] = if terminal { 1.0 } else { 0.0 };

        self.idx = (self.idx + 1) % self.capacity;
        self.used = (self.used + 1).min(self.capacity);
    }
}
