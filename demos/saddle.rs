//! Training a saddle function: a one-hidden-layer network learns
//! `y = x1^2 - x2^2` on random batches from `[-1, 1]^2`.

use anyhow::Result;
use rudder::{library_init, Activation, Adam, Loss, Matrix, Mlp};

fn f(x1: f64, x2: f64) -> f64 {
    x1 * x1 - x2 * x2
}

/// Fills `x` with random points from the saddle's domain and `y` with the
/// function values.
fn sample(x: &mut Matrix, y: &mut Matrix) {
    x.randomize(-1.0, 1.0);
    for row in 0..y.rows() {
        y[(row, 0)] = f(x[(row, 0)], x[(row, 1)]);
    }
}

fn main() -> Result<()> {
    library_init();

    // Two inputs, one output, 64 ReLU neurons in the hidden layer, linear
    // output, batches of 32 samples.
    let mut mlp = Mlp::new(2, 1, &[64], Activation::Relu, Activation::Linear, 32);
    let mut adam = Adam::new(&mlp);

    let mut x = Matrix::new(32, 2);
    let mut y = Matrix::new(32, 1);

    let mut loss = 0.0;
    for step in 1..=10_000 {
        sample(&mut x, &mut y);

        mlp.feedforward(&x)?;
        loss += mlp.backpropagate(&y, Loss::Mse)?;
        adam.optimize(&mut mlp);

        // Mean loss over the last 100 steps.
        if step % 100 == 0 {
            println!("{} {:.6}", step, loss / 100.0);
            loss = 0.0;
        }
    }

    Ok(())
}
