use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Process-wide generator. Every sampling routine in the crate draws from
/// this one source, so two agents in the same process contend on it and a
/// single `seed_with` call makes a whole run reproducible.
static GLOBAL_RNG: OnceLock<Mutex<StdRng>> = OnceLock::new();

fn global() -> &'static Mutex<StdRng> {
    GLOBAL_RNG.get_or_init(|| Mutex::new(StdRng::seed_from_u64(0)))
}

/// Seeds the generator from wall-clock time. Called by `library_init`.
pub fn init() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    seed_with(nanos);
}

/// Re-seeds the generator deterministically.
pub fn seed_with(seed: u64) {
    *global().lock().expect("rng mutex poisoned") = StdRng::seed_from_u64(seed);
}

/// Runs `f` with exclusive access to the global generator.
pub fn with_rng<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
    f(&mut global().lock().expect("rng mutex poisoned"))
}

/// Uniform integer with inclusive endpoints.
pub fn random_int(min: i32, max: i32) -> i32 {
    with_rng(|rng| rng.gen_range(min..=max))
}

/// Uniform real in `[min, max)`.
pub fn random_double(min: f64, max: f64) -> f64 {
    with_rng(|rng| rng.gen_range(min..max))
}
