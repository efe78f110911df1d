//! Solving the pendulum swing-up problem with DDPG. No rendering, just the
//! simulated states and the per-episode mean reward on stdout.

use std::f64::consts::PI;

use anyhow::Result;
use rudder::{library_init, rng, Ddpg, DdpgConfig};

const MAX_SPEED: f64 = 8.0;
const DT: f64 = 0.05;
const G: f64 = 9.81;
const MASS: f64 = 1.0;
const LENGTH: f64 = 1.0;

const EPISODE_LENGTH: usize = 200;
const EPISODE_COUNT: usize = 100;
const STARTING_EPISODES: usize = 3;

/// Simulates one step of pendulum motion and returns the reward (the
/// negative cost) of the current state.
fn pendulum_step(state: &mut [f64; 2], action: f64) -> f64 {
    let theta = state[0];
    let mut thetadot = state[1];

    let cost = theta.powi(2) + 0.1 * thetadot.powi(2) + 0.001 * action.powi(2);

    thetadot +=
        (3.0 * G / (2.0 * LENGTH) * theta.sin() + 3.0 / (MASS * LENGTH.powi(2)) * action) * DT;
    thetadot = thetadot.clamp(-MAX_SPEED, MAX_SPEED);

    let mut theta = theta + thetadot * DT;
    if theta > PI {
        theta -= 2.0 * PI;
    }
    if theta < -PI {
        theta += 2.0 * PI;
    }

    state[0] = theta;
    state[1] = thetadot;
    -cost
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
    library_init();

    // States have two values, actions one with 0.01 exploration noise; both
    // networks use hidden layers of 128 and 64 neurons; memory holds 100K
    // observations; training draws batches of 32.
    let mut ddpg = Ddpg::new(DdpgConfig {
        state_size: 2,
        action_size: 1,
        noise: Some(vec![0.01]),
        actor_hidden: vec![128, 64],
        critic_hidden: vec![128, 64],
        memory_size: 100_000,
        batch_size: 32,
    });

    if ddpg.load_policy("pendulum.ddpg").is_ok() {
        println!("Loaded the pre-trained model.");
    } else {
        println!("No pre-trained model. Training from scratch.");
    }

    let mut state = [0.0f64; 2];
    let mut action = [0.0f64; 1];

    for episode in 0..EPISODE_COUNT {
        let mut episode_reward = 0.0;

        state[0] = rng::random_double(-PI, PI);
        state[1] = 0.0;
        ddpg.new_episode();

        for _ in 0..EPISODE_LENGTH {
            // The first few episodes only explore at random.
            if episode < STARTING_EPISODES {
                action[0] = rng::random_double(-1.0, 1.0);
            } else {
                action[0] = ddpg.action(&state)?[0];
            }

            // This domain's torque range is [-2, 2]; scale the bounded action.
            let reward = pendulum_step(&mut state, 2.0 * action[0]);
            episode_reward += reward;

            // Episodes here end in arbitrary states, so no transition is
            // marked terminal.
            ddpg.observe(&action, reward, &state, false);
            if episode >= STARTING_EPISODES {
                ddpg.train(0.99)?;
            }
        }

        ddpg.update_target_networks();
        println!("{} {:.6}", episode, episode_reward / EPISODE_LENGTH as f64);
    }

    if ddpg.save_policy("pendulum.ddpg").is_ok() {
        println!("Trained model saved.");
    } else {
        println!("Could not save the trained model.");
    }

    Ok(())
}
