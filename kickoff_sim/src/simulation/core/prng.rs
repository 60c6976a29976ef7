// kickoff_sim/src/simulation/core/prng.rs

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// A newtype wrapper around `ChaCha8Rng`.
/// This is the central, deterministic pseudo-random number generator for a scenario run.
#[derive(Debug, Clone)]
pub struct SimulationRng(pub ChaCha8Rng);

impl SimulationRng {
    /// Seeds from `seed`, or from OS entropy if none is configured.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(ChaCha8Rng::seed_from_u64(seed)),
            None => Self(ChaCha8Rng::from_entropy()),
        }
    }

    /// Zero-mean Gaussian sample. A non-positive `std_dev` yields exactly 0.
    pub fn gaussian(&mut self, std_dev: f64) -> f64 {
        if !(std_dev > 0.0) {
            return 0.0;
        }
        match Normal::new(0.0, std_dev) {
            Ok(normal) => normal.sample(&mut self.0),
            Err(_) => 0.0,
        }
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        p > 0.0 && self.0.gen::<f64>() < p
    }

    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high > low {
            self.0.gen_range(low..high)
        } else {
            low
        }
    }
}
