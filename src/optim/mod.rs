use crate::matrix::Matrix;
use crate::mlp::Mlp;

/// Adam optimizer bound to one network's layer shapes. The first and second
/// moment estimates mirror the weight and bias matrices of every layer and
/// are updated against the gradients that `backpropagate` left behind.
#[derive(Clone, Debug)]
pub struct Adam {
    t: u64,
    alpha: f64,
    beta1: f64,
    beta2: f64,
    beta1t: f64,
    beta2t: f64,
    epsilon: f64,
    mw: Vec<Matrix>,
    mb: Vec<Matrix>,
    vw: Vec<Matrix>,
    vb: Vec<Matrix>,
}

impl Adam {
    /// Creates an optimizer sized from `mlp` with the default
    /// hyper-parameters `alpha = 1e-3`, `beta1 = 0.9`, `beta2 = 0.999`,
    /// `epsilon = 1e-7`.
    pub fn new(mlp: &Mlp) -> Self {
        let shape_of = |m: &Matrix| Matrix::new(m.rows(), m.columns());
        let mut adam = Self {
            t: 0,
            alpha: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            beta1t: 0.9,
            beta2t: 0.999,
            epsilon: 1e-7,
            mw: mlp.layers.iter().map(|l| shape_of(&l.weights)).collect(),
            mb: mlp.layers.iter().map(|l| shape_of(&l.biases)).collect(),
            vw: mlp.layers.iter().map(|l| shape_of(&l.weights)).collect(),
            vb: mlp.layers.iter().map(|l| shape_of(&l.biases)).collect(),
        };
        adam.reset();
        adam
    }

    /// Overrides the hyper-parameters. The running decay products are
    /// re-armed from the new betas; the step counter and moments are left
    /// untouched.
    pub fn set(&mut self, alpha: f64, beta1: f64, beta2: f64, epsilon: f64) {
        self.alpha = alpha;
        self.beta1 = beta1;
        self.beta1t = beta1;
        self.beta2 = beta2;
        self.beta2t = beta2;
        self.epsilon = epsilon;
    }

    /// Zeroes the step counter and all moment estimates.
    pub fn reset(&mut self) {
        self.t = 0;
        self.beta1t = self.beta1;
        self.beta2t = self.beta2;
        for m in self
            .mw
            .iter_mut()
            .chain(&mut self.mb)
            .chain(&mut self.vw)
            .chain(&mut self.vb)
        {
            m.clear();
        }
    }

    pub fn step(&self) -> u64 {
        self.t
    }

    /// Applies one Adam step to `mlp` from its stored gradients. The network
    /// must be the one this optimizer was sized from (or an architectural
    /// twin).
    pub fn optimize(&mut self, mlp: &mut Mlp) {
        debug_assert_eq!(self.mw.len(), mlp.layers.len());

        self.t += 1;
        let (b1, b2) = (self.beta1, self.beta2);
        let (b1t, b2t) = (self.beta1t, self.beta2t);
        let (alpha, eps) = (self.alpha, self.epsilon);

        for (i, layer) in mlp.layers.iter_mut().enumerate() {
            debug_assert_eq!(self.mw[i].shape(), layer.weights.shape());
            debug_assert_eq!(self.mb[i].shape(), layer.biases.shape());

            let weights = layer.weights.as_slice_mut();
            let grads = layer.grad_weights.as_slice();
            let mw = self.mw[i].as_slice_mut();
            let vw = self.vw[i].as_slice_mut();
            for (((w, &g), m), v) in weights.iter_mut().zip(grads).zip(mw).zip(vw) {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                let m_hat = *m / (1.0 - b1t);
                let v_hat = *v / (1.0 - b2t);
                *w -= alpha * (m_hat / (v_hat.sqrt() + eps));
            }

            // Bias path: epsilon sits outside the division and sqrt(v̂) is
            // unclamped; a zero second moment propagates as an IEEE NaN or
            // infinity rather than being guarded here.
            let biases = layer.biases.as_slice_mut();
            let grads = layer.grad_biases.as_slice();
            let mb = self.mb[i].as_slice_mut();
            let vb = self.vb[i].as_slice_mut();
            for (((b, &g), m), v) in biases.iter_mut().zip(grads).zip(mb).zip(vb) {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                let m_hat = *m / (1.0 - b1t);
                let v_hat = *v / (1.0 - b2t);
                *b -= alpha * (m_hat / v_hat.sqrt() + eps);
            }
        }

        self.beta1t *= self.beta1;
        self.beta2t *= self.beta2;
    }
}
