use serde::{Deserialize, Serialize};

use crate::matrix::Matrix;

/// Output-layer loss. Each variant writes the error matrix consumed by
/// back-propagation and returns a scalar summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Loss {
    /// Mean squared error: `error = yhat - y`, returns the mean square.
    Mse,
    /// The caller already computed an error signal; `y` is copied through
    /// unchanged and the mean is returned. Used to chain back-propagation
    /// across networks.
    PassThrough,
}

impl Loss {
    /// Fills `error` from `yhat` and `y` and returns the scalar loss.
    /// All three matrices share the `(batch, outputs)` shape.
    pub fn apply(self, yhat: &Matrix, y: &Matrix, error: &mut Matrix) -> f64 {
        match self {
            Loss::Mse => {
                error.assign_difference(yhat, y);
                let n = error.len() as f64;
                error.as_slice().iter().map(|e| e * e).sum::<f64>() / n
            }
            Loss::PassThrough => {
                error
                    .copy_from(y)
                    .expect("error buffer matches the target shape");
                error.mean()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mse_returns_mean_square_and_raw_difference() {
        let mut yhat = Matrix::new(2, 2);
        let mut y = Matrix::new(2, 2);
        let mut error = Matrix::new(2, 2);
        yhat.as_slice_mut().copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        y.as_slice_mut().copy_from_slice(&[0.0, 2.0, 1.0, 0.0]);

        let loss = Loss::Mse.apply(&yhat, &y, &mut error);
        assert_eq!(error.as_slice(), &[1.0, 0.0, 2.0, 4.0]);
        assert!((loss - (1.0 + 0.0 + 4.0 + 16.0) / 4.0).abs() < 1e-15);
    }

    #[test]
    fn pass_through_copies_the_supplied_signal() {
        let yhat = Matrix::new(1, 3);
        let mut y = Matrix::new(1, 3);
        let mut error = Matrix::new(1, 3);
        y.as_slice_mut().copy_from_slice(&[0.5, -0.5, 1.5]);

        let loss = Loss::PassThrough.apply(&yhat, &y, &mut error);
        assert_eq!(error.as_slice(), y.as_slice());
        assert!((loss - 0.5).abs() < 1e-15);
    }
}
