pub mod layer;
pub use layer::Layer;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::activations::Activation;
use crate::errors::{RudderError, RudderResult};
use crate::loss::Loss;
use crate::matrix::Matrix;

/// A fully-connected network with a batch shape fixed at construction.
/// Every buffer (parameters, activations, gradients, scratch) is allocated
/// once here and reused on every pass; training and inference never allocate.
///
/// Internally activations flow in `width x batch` orientation while the
/// public interface exchanges `batch x width` matrices; `feedforward`
/// transposes on the way in and out. The errors/deltas blocks stay
/// `batch x width`, which is what lets gradients fall out of one
/// `(input · deltas)ᵀ` product per layer.
#[derive(Clone, Debug)]
pub struct Mlp {
    depth: usize,
    batch_size: usize,
    input_size: usize,
    output_size: usize,
    pub layers: Vec<Layer>,
    input: Matrix,
    input_errors: Matrix,
    output: Matrix,
}

impl Mlp {
    /// Builds a network of `hidden.len() + 1` layers and initializes it with
    /// Glorot-uniform weights.
    pub fn new(
        input_size: usize,
        output_size: usize,
        hidden: &[usize],
        hidden_activation: Activation,
        output_activation: Activation,
        batch_size: usize,
    ) -> Self {
        let depth = hidden.len();
        let mut layers = Vec::with_capacity(depth + 1);

        let mut layer_input = input_size;
        for &width in hidden {
            layers.push(Layer::new(layer_input, width, batch_size, hidden_activation));
            layer_input = width;
        }
        layers.push(Layer::new(
            layer_input,
            output_size,
            batch_size,
            output_activation,
        ));

        let mut mlp = Self {
            depth,
            batch_size,
            input_size,
            output_size,
            layers,
            input: Matrix::new(input_size, batch_size),
            input_errors: Matrix::new(batch_size, input_size),
            output: Matrix::new(batch_size, output_size),
        };
        mlp.initialize();
        mlp
    }

    /// Re-randomizes the weights (Glorot-uniform, `limit = sqrt(6 / (fan_in +
    /// fan_out))`) and zeroes biases and all transient state.
    pub fn initialize(&mut self) {
        for layer in &mut self.layers {
            let fan = (layer.weights.rows() + layer.weights.columns()) as f64;
            let limit = (6.0 / fan).sqrt();
            layer.weights.randomize(-limit, limit);
            layer.clear_state();
        }
        self.input.clear();
        self.input_errors.clear();
        self.output.clear();
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// The `batch x outputs` result of the last forward pass.
    pub fn output(&self) -> &Matrix {
        &self.output
    }

    /// The `batch x inputs` error signal of the last backward pass. Feeding
    /// this into another network's `backpropagate` chains the two.
    pub fn input_errors(&self) -> &Matrix {
        &self.input_errors
    }

    /// Runs the batch `x` (`batch x inputs`) through the network and returns
    /// the `batch x outputs` result, which stays owned by the network.
    #[tracing::instrument(skip(self, x), name = "mlp_feedforward")]
    pub fn feedforward(&mut self, x: &Matrix) -> RudderResult<&Matrix> {
        if x.shape() != (self.batch_size, self.input_size) {
            return Err(RudderError::ShapeMismatch {
                expected: (self.batch_size, self.input_size),
                found: x.shape(),
            });
        }

        self.input.assign_transpose(x);
        for i in 0..self.layers.len() {
            let (before, rest) = self.layers.split_at_mut(i);
            let source = match before.last() {
                Some(previous) => &previous.output,
                None => &self.input,
            };
            rest[0].forward(source);
        }
        self.output
            .assign_transpose(&self.layers[self.depth].output);
        Ok(&self.output)
    }

    /// Back-propagates against the targets (or externally supplied error
    /// signal) `y`, filling every layer's gradient buffers. Requires a
    /// preceding `feedforward` on the same batch shape. Returns the scalar
    /// loss.
    #[tracing::instrument(skip(self, y), name = "mlp_backpropagate")]
    pub fn backpropagate(&mut self, y: &Matrix, loss: Loss) -> RudderResult<f64> {
        if y.shape() != (self.batch_size, self.output_size) {
            return Err(RudderError::ShapeMismatch {
                expected: (self.batch_size, self.output_size),
                found: y.shape(),
            });
        }

        let depth = self.depth;
        let batch = self.batch_size as f64;

        let loss_value = loss.apply(&self.output, y, &mut self.layers[depth].errors);
        self.layers[depth].compute_output_deltas(&self.output, depth > 0);

        for i in (0..depth).rev() {
            let (head, tail) = self.layers.split_at_mut(i + 1);
            let next = &tail[0];
            head[i].errors.assign_dot(&next.deltas, &next.weights);
            head[i].compute_hidden_deltas();
        }

        self.input_errors
            .assign_dot(&self.layers[0].deltas, &self.layers[0].weights);

        for i in 0..=depth {
            let (before, rest) = self.layers.split_at_mut(i);
            let source = match before.last() {
                Some(previous) => &previous.output,
                None => &self.input,
            };
            let layer = &mut rest[0];
            layer.grad_weights.assign_dot_transpose(source, &layer.deltas);
            layer.grad_weights /= batch;
            layer.grad_biases.assign_sum_rows_transpose(&layer.deltas);
            layer.grad_biases /= batch;
        }

        Ok(loss_value)
    }

    /// Plain gradient descent over the stored gradients. The gradient
    /// buffers are scaled by `lr` in place and must not be reused afterwards.
    pub fn sgd(&mut self, lr: f64) {
        for layer in &mut self.layers {
            layer.grad_weights *= lr;
            layer.weights -= &layer.grad_weights;
            layer.grad_biases *= lr;
            layer.biases -= &layer.grad_biases;
        }
    }

    /// Gradient descent with the weight gradients rescaled so their
    /// Frobenius norm does not exceed `clipnorm`.
    pub fn sgd_clip(&mut self, lr: f64, clipnorm: f64) {
        for layer in &mut self.layers {
            clip_gradients(&mut layer.grad_weights, clipnorm);
            layer.grad_weights *= lr;
            layer.weights -= &layer.grad_weights;
            layer.grad_biases *= lr;
            layer.biases -= &layer.grad_biases;
        }
    }

    /// Structural overwrite from a network of identical architecture: every
    /// buffer, including transient state, is copied. Used for target-network
    /// synchronization.
    pub fn copy_from(&mut self, src: &Mlp) -> RudderResult<()> {
        if self.layers.len() != src.layers.len() {
            return Err(RudderError::ShapeMismatch {
                expected: (self.layers.len(), 0),
                found: (src.layers.len(), 0),
            });
        }
        for (dst, s) in self.layers.iter_mut().zip(&src.layers) {
            dst.weights.copy_from(&s.weights)?;
            dst.biases.copy_from(&s.biases)?;
            dst.output.copy_from(&s.output)?;
            dst.errors.copy_from(&s.errors)?;
            dst.deltas.copy_from(&s.deltas)?;
            dst.grad_weights.copy_from(&s.grad_weights)?;
            dst.grad_biases.copy_from(&s.grad_biases)?;
            dst.activation = s.activation;
        }
        self.input.copy_from(&src.input)?;
        self.input_errors.copy_from(&src.input_errors)?;
        self.output.copy_from(&src.output)?;
        Ok(())
    }

    /// Writes each layer's weights then biases in the matrix binary format.
    /// Activation choices and optimizer state are not part of the format;
    /// the reader must reconstruct an architecturally identical network.
    pub fn write_weights(&self, writer: &mut impl Write) -> RudderResult<()> {
        for layer in &self.layers {
            layer.weights.write_to(writer)?;
            layer.biases.write_to(writer)?;
        }
        Ok(())
    }

    /// Reads weights and biases into the existing layers, failing with
    /// `ShapeMismatch` if any stored matrix does not match its slot.
    pub fn read_weights(&mut self, reader: &mut impl Read) -> RudderResult<()> {
        for layer in &mut self.layers {
            let weights = Matrix::read_from(reader)?;
            layer.weights.copy_from(&weights)?;
            let biases = Matrix::read_from(reader)?;
            layer.biases.copy_from(&biases)?;
        }
        Ok(())
    }

    pub fn save_weights(&self, path: impl AsRef<Path>) -> RudderResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_weights(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_weights(&mut self, path: impl AsRef<Path>) -> RudderResult<()> {
        let mut reader = BufReader::new(File::open(path)?);
        self.read_weights(&mut reader)
    }
}

fn clip_gradients(gradients: &mut Matrix, clipnorm: f64) {
    let norm = gradients.frobenius_norm();
    if norm > clipnorm {
        *gradients *= clipnorm / norm;
    }
}
