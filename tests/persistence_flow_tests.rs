use rudder::{rng, Activation, Ddpg, DdpgConfig, Loss, Matrix, Mlp, RudderError};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("rudder_{}_{}", std::process::id(), name))
}

/// Bit-level equality: round trips must preserve even the NaNs a trained
/// network can carry in its bias blocks.
fn assert_same_bits(a: &Matrix, b: &Matrix) {
    assert_eq!(a.shape(), b.shape());
    for (&x, &y) in a.as_slice().iter().zip(b.as_slice()) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
}

fn assert_same_slice_bits(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len());
    for (&x, &y) in a.iter().zip(b) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
}

fn pendulum_sized_config() -> DdpgConfig {
    DdpgConfig {
        state_size: 2,
        action_size: 1,
        noise: None,
        actor_hidden: vec![8, 6],
        critic_hidden: vec![8, 6],
        memory_size: 128,
        batch_size: 8,
    }
}

fn train_briefly(ddpg: &mut Ddpg) {
    ddpg.new_episode();
    ddpg.observe(&[0.0], 0.0, &[0.2, -0.1], false);
    for k in 0..32 {
        let v = (k as f64 * 0.61).cos();
        ddpg.observe(&[v * 0.5], -v * v, &[-v, v * 0.3], false);
    }
    for _ in 0..8 {
        ddpg.train(0.99).unwrap();
    }
}

#[test]
fn mlp_weights_round_trip_bit_identically() {
    let path = temp_path("mlp_weights.bin");

    let mut original = Mlp::new(3, 2, &[5, 4], Activation::Relu, Activation::Tanh, 2);
    // Make the biases nonzero so the round trip covers both blocks.
    let x = Matrix::random(2, 3, -1.0, 1.0);
    let y = Matrix::random(2, 2, -1.0, 1.0);
    original.feedforward(&x).unwrap();
    original.backpropagate(&y, Loss::Mse).unwrap();
    original.sgd(0.1);
    original.save_weights(&path).unwrap();

    let mut restored = Mlp::new(3, 2, &[5, 4], Activation::Relu, Activation::Tanh, 2);
    restored.load_weights(&path).unwrap();
    for (a, b) in original.layers.iter().zip(&restored.layers) {
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.biases, b.biases);
    }

    std::fs::remove_file(&path).ok();
}

#[test]
fn mlp_weights_refuse_a_mismatched_architecture() {
    let path = temp_path("mlp_weights_mismatch.bin");

    let original = Mlp::new(3, 2, &[5], Activation::Relu, Activation::Tanh, 2);
    original.save_weights(&path).unwrap();

    let mut narrower = Mlp::new(3, 2, &[4], Activation::Relu, Activation::Tanh, 2);
    assert!(matches!(
        narrower.load_weights(&path),
        Err(RudderError::ShapeMismatch { .. })
    ));

    std::fs::remove_file(&path).ok();
}

#[test]
fn truncated_weight_files_fail_to_load() {
    let path = temp_path("mlp_weights_truncated.bin");

    let original = Mlp::new(3, 2, &[5], Activation::Relu, Activation::Tanh, 2);
    original.save_weights(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let mut restored = Mlp::new(3, 2, &[5], Activation::Relu, Activation::Tanh, 2);
    assert!(restored.load_weights(&path).is_err());

    std::fs::remove_file(&path).ok();
}

#[test]
fn policy_round_trip_reproduces_the_actions() {
    let path = temp_path("policy.ddpg");

    let mut trained = Ddpg::new(pendulum_sized_config());
    train_briefly(&mut trained);
    trained.save_policy(&path).unwrap();

    let mut restored = Ddpg::new(pendulum_sized_config());
    restored.load_policy(&path).unwrap();

    for (a, b) in trained.actor().layers.iter().zip(&restored.actor().layers) {
        assert_same_bits(&a.weights, &b.weights);
        assert_same_bits(&a.biases, &b.biases);
    }
    for (a, b) in trained.critic().layers.iter().zip(&restored.critic().layers) {
        assert_same_bits(&a.weights, &b.weights);
        assert_same_bits(&a.biases, &b.biases);
    }

    for _ in 0..50 {
        let state = [
            rng::random_double(-1.0, 1.0),
            rng::random_double(-1.0, 1.0),
        ];
        let expected = trained.action(&state).unwrap().to_vec();
        let actual = restored.action(&state).unwrap().to_vec();
        assert_same_slice_bits(&expected, &actual);
    }

    std::fs::remove_file(&path).ok();
}

#[test]
fn policy_files_do_not_carry_the_targets_or_memory() {
    let path = temp_path("policy_scope.ddpg");

    let mut trained = Ddpg::new(pendulum_sized_config());
    train_briefly(&mut trained);
    trained.save_policy(&path).unwrap();

    let mut restored = Ddpg::new(pendulum_sized_config());
    let stale_target = restored.actor_target().layers[0].weights.clone();
    restored.load_policy(&path).unwrap();

    assert_eq!(restored.actor_target().layers[0].weights, stale_target);
    assert_eq!(restored.memory().len(), 0);

    std::fs::remove_file(&path).ok();
}

#[test]
fn config_round_trips_through_json() {
    let config = DdpgConfig {
        state_size: 2,
        action_size: 1,
        noise: Some(vec![0.01]),
        actor_hidden: vec![128, 64],
        critic_hidden: vec![128, 64],
        memory_size: 100_000,
        batch_size: 32,
    };

    let json = serde_json::to_string(&config).unwrap();
    let parsed: DdpgConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.state_size, config.state_size);
    assert_eq!(parsed.noise, config.noise);
    assert_eq!(parsed.actor_hidden, config.actor_hidden);
    assert_eq!(parsed.memory_size, config.memory_size);
}

#[test]
fn matrices_round_trip_through_json() {
    let original = Matrix::random(3, 5, -2.0, 2.0);
    let json = serde_json::to_string(&original).unwrap();
    let parsed: Matrix = serde_json::from_str(&json).unwrap();
    assert_eq!(original, parsed);
}
