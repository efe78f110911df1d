use crate::activations::Activation;
use crate::matrix::Matrix;

/// One dense layer of a fixed-batch network. Weights are `outputs x inputs`;
/// biases, activations and bias gradients are kept `outputs x batch` (every
/// bias column identical), while the error signal and the local deltas use
/// the `batch x outputs` orientation that back-propagation consumes.
#[derive(Clone, Debug)]
pub struct Layer {
    pub weights: Matrix,
    pub biases: Matrix,
    pub(crate) output: Matrix,
    pub(crate) errors: Matrix,
    pub(crate) deltas: Matrix,
    pub grad_weights: Matrix,
    pub grad_biases: Matrix,
    pub activation: Activation,
}

impl Layer {
    pub(crate) fn new(inputs: usize, outputs: usize, batch: usize, activation: Activation) -> Self {
        Self {
            weights: Matrix::new(outputs, inputs),
            biases: Matrix::new(outputs, batch),
            output: Matrix::new(outputs, batch),
            errors: Matrix::new(batch, outputs),
            deltas: Matrix::new(batch, outputs),
            grad_weights: Matrix::new(outputs, inputs),
            grad_biases: Matrix::new(outputs, batch),
            activation,
        }
    }

    pub fn inputs(&self) -> usize {
        self.weights.columns()
    }

    pub fn outputs(&self) -> usize {
        self.weights.rows()
    }

    /// `output = activation(weights · input + biases)`, where `input` is the
    /// previous layer's `outputs x batch` activation block.
    pub(crate) fn forward(&mut self, input: &Matrix) {
        self.output.assign_dot(&self.weights, input);
        self.output += &self.biases;
        let activation = self.activation;
        self.output.apply(|v| activation.apply(v));
    }

    /// Output-layer deltas, seeded from the public `batch x outputs` output
    /// block. The error signal is only folded in for networks with hidden
    /// layers; a lone output layer has already absorbed it through the loss.
    pub(crate) fn compute_output_deltas(&mut self, output: &Matrix, include_errors: bool) {
        self.deltas
            .copy_from(output)
            .expect("delta buffer matches the output block");
        let activation = self.activation;
        self.deltas.apply(|v| activation.derivative(v));
        if include_errors {
            self.deltas *= &self.errors;
        }
    }

    /// Hidden-layer deltas: `errors ⊙ activation'(outputᵀ)`.
    pub(crate) fn compute_hidden_deltas(&mut self) {
        self.deltas.assign_transpose(&self.output);
        let activation = self.activation;
        self.deltas.apply(|v| activation.derivative(v));
        self.deltas *= &self.errors;
    }

    pub(crate) fn clear_state(&mut self) {
        self.biases.clear();
        self.output.clear();
        self.errors.clear();
        self.deltas.clear();
        self.grad_weights.clear();
        self.grad_biases.clear();
    }
}
