pub mod memory;
pub use memory::ReplayMemory;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use num_traits::clamp;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::errors::RudderResult;
use crate::loss::Loss;
use crate::matrix::Matrix;
use crate::mlp::Mlp;
use crate::optim::Adam;
use crate::rng;

/// Construction parameters for a `Ddpg` agent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DdpgConfig {
    pub state_size: usize,
    pub action_size: usize,
    /// Per-coordinate symmetric uniform exploration noise; `None` disables
    /// noise and clipping on the action path.
    pub noise: Option<Vec<f64>>,
    pub actor_hidden: Vec<usize>,
    pub critic_hidden: Vec<usize>,
    pub memory_size: usize,
    pub batch_size: usize,
}

/// Deep Deterministic Policy Gradient agent: an actor mapping state to a
/// `[-1, 1]`-bounded action, a critic mapping `(action, state)` to a scalar
/// Q-value, hard-copied target twins of both, a replay ring buffer, and the
/// training step that couples the two networks through the critic's
/// input-error path. All scratch is preallocated; stepping the agent never
/// allocates.
pub struct Ddpg {
    state_size: usize,
    action_size: usize,
    action: Vec<f64>,
    noise: Option<Vec<f64>>,
    actor: Mlp,
    critic: Mlp,
    actor_target: Mlp,
    critic_target: Mlp,
    actor_adam: Adam,
    critic_adam: Adam,
    actor_input: Matrix,
    critic_input: Matrix,
    actor_errors: Matrix,
    critic_errors: Matrix,
    batch_size: usize,
    batch_indices: Vec<usize>,
    memory: ReplayMemory,
    last_state: Vec<f64>,
    last_state_valid: bool,
}

impl Ddpg {
    pub fn new(config: DdpgConfig) -> Self {
        let DdpgConfig {
            state_size,
            action_size,
            noise,
            actor_hidden,
            critic_hidden,
            memory_size,
            batch_size,
        } = config;

        if let Some(noise) = &noise {
            assert_eq!(
                noise.len(),
                action_size,
                "noise vector length must equal the action size"
            );
        }

        let actor = Mlp::new(
            state_size,
            action_size,
            &actor_hidden,
            Activation::Relu,
            Activation::Tanh,
            batch_size,
        );
        let critic = Mlp::new(
            action_size + state_size,
            1,
            &critic_hidden,
            Activation::Relu,
            Activation::Linear,
            batch_size,
        );
        let actor_target = actor.clone();
        let critic_target = critic.clone();
        let actor_adam = Adam::new(&actor);
        let critic_adam = Adam::new(&critic);

        Self {
            state_size,
            action_size,
            action: vec![0.0; action_size],
            noise,
            actor,
            critic,
            actor_target,
            critic_target,
            actor_adam,
            critic_adam,
            actor_input: Matrix::new(batch_size, state_size),
            critic_input: Matrix::new(batch_size, action_size + state_size),
            actor_errors: Matrix::new(batch_size, action_size),
            critic_errors: Matrix::new(batch_size, 1),
            batch_size,
            batch_indices: vec![0; batch_size],
            memory: ReplayMemory::new(memory_size, state_size, action_size),
            last_state: vec![0.0; state_size],
            last_state_valid: false,
        }
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    pub fn action_size(&self) -> usize {
        self.action_size
    }

    pub fn actor(&self) -> &Mlp {
        &self.actor
    }

    pub fn actor_mut(&mut self) -> &mut Mlp {
        &mut self.actor
    }

    pub fn critic(&self) -> &Mlp {
        &self.critic
    }

    pub fn critic_mut(&mut self) -> &mut Mlp {
        &mut self.critic
    }

    pub fn actor_target(&self) -> &Mlp {
        &self.actor_target
    }

    pub fn critic_target(&self) -> &Mlp {
        &self.critic_target
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn last_state(&self) -> &[f64] {
        &self.last_state
    }

    /// Runs the actor on `state` and returns the proposed action, with
    /// exploration noise applied and clipped to `[-1, 1]` when noise is
    /// configured. The returned slice lives in the agent and is overwritten
    /// by the next call.
    pub fn action(&mut self, state: &[f64]) -> RudderResult<&[f64]> {
        assert_eq!(state.len(), self.state_size);

        // The actor expects a whole batch; only the first sample is real.
        self.actor_input.clear();
        self.actor_input.row_mut(0).copy_from_slice(state);
        let result = self.actor.feedforward(&self.actor_input)?;
        self.action.copy_from_slice(result.row(0));

        if let Some(noise) = &self.noise {
            for (value, &magnitude) in self.action.iter_mut().zip(noise) {
                if magnitude > 0.0 {
                    *value += rng::random_double(-magnitude, magnitude);
                }
                *value = clamp(*value, -1.0, 1.0);
            }
        }
        Ok(&self.action)
    }

    /// Feeds one environment transition to the agent. The first call after
    /// `new_episode` only primes the previous-state slot, so episode
    /// boundaries never leak into memory as spurious transitions.
    pub fn observe(&mut self, action: &[f64], reward: f64, next_state: &[f64], terminal: bool) {
        assert_eq!(action.len(), self.action_size);
        assert_eq!(next_state.len(), self.state_size);

        if !self.last_state_valid {
            self.last_state.copy_from_slice(next_state);
            self.last_state_valid = true;
            return;
        }

        self.memory
            .record(&self.last_state, action, reward, next_state, terminal);
        self.last_state.copy_from_slice(next_state);
    }

    /// Marks the start of a new episode.
    pub fn new_episode(&mut self) {
        self.last_state_valid = false;
    }

    /// One training step on a batch drawn uniformly (with replacement) from
    /// the replay memory. Does nothing until the memory holds a full batch.
    ///
    /// The actor follows the deterministic policy gradient: a constant `-1`
    /// error is pushed through the critic, and the action columns of the
    /// critic's input errors become the actor's output-layer error. The
    /// critic then trains separately against the Bellman target built by the
    /// target networks, zeroed on terminal transitions.
    #[tracing::instrument(skip(self), name = "ddpg_train")]
    pub fn train(&mut self, gamma: f64) -> RudderResult<()> {
        if self.memory.len() < self.batch_size {
            return Ok(());
        }

        let a = self.action_size;
        let used = self.memory.len();
        for index in &mut self.batch_indices {
            *index = rng::random_int(0, used as i32 - 1) as usize;
        }

        // Actor update.
        for (i, &k) in self.batch_indices.iter().enumerate() {
            self.actor_input
                .row_mut(i)
                .copy_from_slice(self.memory.prev_state(k));
        }
        let proposed = self.actor.feedforward(&self.actor_input)?;

        for (i, &k) in self.batch_indices.iter().enumerate() {
            let row = self.critic_input.row_mut(i);
            row[..a].copy_from_slice(proposed.row(i));
            row[a..].copy_from_slice(self.memory.prev_state(k));
        }
        self.critic.feedforward(&self.critic_input)?;

        self.critic_errors.fill(-1.0);
        self.critic
            .backpropagate(&self.critic_errors, Loss::PassThrough)?;

        let input_errors = self.critic.input_errors();
        for i in 0..self.batch_size {
            self.actor_errors
                .row_mut(i)
                .copy_from_slice(&input_errors.row(i)[..a]);
        }
        self.actor
            .backpropagate(&self.actor_errors, Loss::PassThrough)?;
        self.actor_adam.optimize(&mut self.actor);

        // Critic update.
        for (i, &k) in self.batch_indices.iter().enumerate() {
            let row = self.critic_input.row_mut(i);
            row[..a].copy_from_slice(self.memory.action(k));
            row[a..].copy_from_slice(self.memory.prev_state(k));
        }
        let critic_output = self.critic.feedforward(&self.critic_input)?;

        for (i, &k) in self.batch_indices.iter().enumerate() {
            self.actor_input
                .row_mut(i)
                .copy_from_slice(self.memory.next_state(k));
        }
        let target_actions = self.actor_target.feedforward(&self.actor_input)?;

        for (i, &k) in self.batch_indices.iter().enumerate() {
            let row = self.critic_input.row_mut(i);
            row[..a].copy_from_slice(target_actions.row(i));
            row[a..].copy_from_slice(self.memory.next_state(k));
        }
        let target_q = self.critic_target.feedforward(&self.critic_input)?;

        for (i, &k) in self.batch_indices.iter().enumerate() {
            let q = critic_output[(i, 0)];
            self.critic_errors[(i, 0)] = if self.memory.terminal(k) {
                q
            } else {
                q - (self.memory.reward(k) + gamma * target_q[(i, 0)])
            };
        }
        self.critic
            .backpropagate(&self.critic_errors, Loss::PassThrough)?;
        self.critic_adam.optimize(&mut self.critic);

        Ok(())
    }

    /// Hard-copies the live networks over their targets.
    pub fn update_target_networks(&mut self) {
        self.actor_target
            .copy_from(&self.actor)
            .expect("actor target shares the actor architecture");
        self.critic_target
            .copy_from(&self.critic)
            .expect("critic target shares the critic architecture");
    }

    /// Writes the actor's weight block followed by the critic's. Target
    /// networks and replay memory are not part of the policy.
    pub fn save_policy(&self, path: impl AsRef<Path>) -> RudderResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.actor.write_weights(&mut writer)?;
        self.critic.write_weights(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads a policy saved by `save_policy` into the live networks. The
    /// agent must have been constructed with the identical architecture.
    pub fn load_policy(&mut self, path: impl AsRef<Path>) -> RudderResult<()> {
        let mut reader = BufReader::new(File::open(path)?);
        self.actor.read_weights(&mut reader)?;
        self.critic.read_weights(&mut reader)
    }
}
