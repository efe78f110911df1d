use rudder::{Activation, Adam, Loss, Matrix, Mlp};

/// A 1 -> 1 linear network whose gradients are exactly 1.0 for both the
/// weight and the bias after one backward pass on x = 1.
fn unit_gradient_network() -> (Mlp, Matrix, Matrix) {
    let mut mlp = Mlp::new(1, 1, &[], Activation::Linear, Activation::Linear, 1);
    mlp.layers[0].weights.fill(0.5);
    mlp.layers[0].biases.clear();

    let mut x = Matrix::new(1, 1);
    x[(0, 0)] = 1.0;
    let y = Matrix::new(1, 1);
    (mlp, x, y)
}

#[test]
fn first_step_matches_the_closed_form() {
    let (mut mlp, x, y) = unit_gradient_network();
    let mut adam = Adam::new(&mlp);

    mlp.feedforward(&x).unwrap();
    mlp.backpropagate(&y, Loss::PassThrough).unwrap();
    adam.optimize(&mut mlp);

    // g = 1: m-hat = 1, v-hat = 1 after bias correction.
    let (alpha, eps) = (1e-3, 1e-7);
    let expected_w = 0.5 - alpha * (1.0 / (1.0 + eps));
    // The bias path adds epsilon outside the division.
    let expected_b = -alpha * (1.0 + eps);

    assert!((mlp.layers[0].weights[(0, 0)] - expected_w).abs() < 1e-15);
    assert!((mlp.layers[0].biases[(0, 0)] - expected_b).abs() < 1e-15);
    assert_eq!(adam.step(), 1);
}

#[test]
fn constant_gradients_give_identical_corrected_steps() {
    // With g fixed at 1, bias correction cancels the moment decay exactly,
    // so every step moves the weight by the same amount.
    let (mut mlp, x, y) = unit_gradient_network();
    let mut adam = Adam::new(&mlp);

    let alpha = 1e-3;
    for step in 1..=3u32 {
        mlp.feedforward(&x).unwrap();
        mlp.backpropagate(&y, Loss::PassThrough).unwrap();
        adam.optimize(&mut mlp);

        let expected = 0.5 - f64::from(step) * alpha * (1.0 / (1.0 + 1e-7));
        assert!((mlp.layers[0].weights[(0, 0)] - expected).abs() < 1e-12);
    }
}

#[test]
fn reset_reproduces_the_first_step() {
    let (mut mlp, x, y) = unit_gradient_network();
    let pristine = mlp.clone();
    let mut adam = Adam::new(&mlp);

    mlp.feedforward(&x).unwrap();
    mlp.backpropagate(&y, Loss::PassThrough).unwrap();
    adam.optimize(&mut mlp);
    let first = mlp.layers[0].weights[(0, 0)];

    adam.reset();
    assert_eq!(adam.step(), 0);

    let mut again = pristine;
    again.feedforward(&x).unwrap();
    again.backpropagate(&y, Loss::PassThrough).unwrap();
    adam.optimize(&mut again);
    assert_eq!(again.layers[0].weights[(0, 0)], first);
}

#[test]
fn set_overrides_the_hyper_parameters() {
    let (mut mlp, x, y) = unit_gradient_network();
    let mut adam = Adam::new(&mlp);
    adam.set(0.01, 0.5, 0.5, 0.0);

    mlp.feedforward(&x).unwrap();
    mlp.backpropagate(&y, Loss::PassThrough).unwrap();
    adam.optimize(&mut mlp);

    // beta1 = beta2 = 0.5, g = 1: m-hat = v-hat = 1, epsilon = 0.
    let expected_w = 0.5 - 0.01;
    assert!((mlp.layers[0].weights[(0, 0)] - expected_w).abs() < 1e-15);
}

#[test]
fn moments_follow_the_network_shape() {
    let mlp = Mlp::new(4, 2, &[8, 6], Activation::Relu, Activation::Linear, 3);
    let mut adam = Adam::new(&mlp);

    // Optimizing a same-shaped clone is legal and leaves all buffers usable.
    let mut twin = mlp.clone();
    let x = Matrix::random(3, 4, -1.0, 1.0);
    let y = Matrix::random(3, 2, -1.0, 1.0);
    twin.feedforward(&x).unwrap();
    twin.backpropagate(&y, Loss::Mse).unwrap();
    adam.optimize(&mut twin);
    assert_eq!(adam.step(), 1);
}
