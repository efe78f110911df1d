use serde::{Deserialize, Serialize};

/// Pointwise activation functions. Derivatives are expressed on the
/// post-activation output `y = f(x)`, so the forward pass never has to keep
/// pre-activation values around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Linear,
    Sigmoid,
    Tanh,
    Relu,
}

impl Activation {
    /// Resolves the wire-format integer code. Unknown codes fall back to
    /// `Linear`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Activation::Sigmoid,
            2 => Activation::Tanh,
            3 => Activation::Relu,
            _ => Activation::Linear,
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Sigmoid => {
                if x >= 0.0 {
                    1.0 / (1.0 + (-x).exp())
                } else {
                    let e = x.exp();
                    e / (1.0 + e)
                }
            }
            Activation::Tanh => x.tanh(),
            Activation::Relu => {
                if x >= 0.0 {
                    x
                } else {
                    0.0
                }
            }
        }
    }

    /// Derivative in terms of the output `y = f(x)`.
    pub fn derivative(self, y: f64) -> f64 {
        match self {
            Activation::Linear => 1.0,
            Activation::Sigmoid => y * (1.0 - y),
            Activation::Tanh => 1.0 - y * y,
            Activation::Relu => {
                if y > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_derivative_pairs_with_output() {
        for &x in &[-4.0, -1.0, -0.25, 0.0, 0.5, 3.0] {
            let y = Activation::Sigmoid.apply(x);
            let expected = y * (1.0 - y);
            assert!((Activation::Sigmoid.derivative(y) - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn sigmoid_is_symmetric_around_zero() {
        for &x in &[0.1, 1.0, 5.0, 20.0] {
            let pos = Activation::Sigmoid.apply(x);
            let neg = Activation::Sigmoid.apply(-x);
            assert!((pos + neg - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn tanh_derivative_pairs_with_output() {
        for &x in &[-2.0, -0.5, 0.0, 0.5, 2.0] {
            let y = Activation::Tanh.apply(x);
            assert!((Activation::Tanh.derivative(y) - (1.0 - y * y)).abs() < 1e-15);
        }
    }

    #[test]
    fn unknown_codes_resolve_to_linear() {
        assert_eq!(Activation::from_code(0), Activation::Linear);
        assert_eq!(Activation::from_code(42), Activation::Linear);
        assert_eq!(Activation::from_code(-1), Activation::Linear);
    }
}
