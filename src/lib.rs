pub mod activations;
pub mod ddpg;
pub mod errors;
pub mod loss;
pub mod matrix;
pub mod mlp;
pub mod optim;
pub mod rng;

pub use activations::Activation;
pub use ddpg::{Ddpg, DdpgConfig, ReplayMemory};
pub use errors::{RudderError, RudderResult};
pub use loss::Loss;
pub use matrix::Matrix;
pub use mlp::Mlp;
pub use optim::Adam;

/// Seeds the process-global random source from wall-clock time. Call once at
/// startup, before constructing networks or agents; tests should prefer
/// `rng::seed_with` for determinism.
pub fn library_init() {
    rng::init();
}
