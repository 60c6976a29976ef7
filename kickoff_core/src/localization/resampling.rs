// kickoff_core/src/localization/resampling.rs

use rand::Rng;
use serde::Deserialize;

use super::WeightedParticle;

/// Decides when the particle distribution is degenerate enough to resample.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "PascalCase")]
pub enum ResamplingTrigger {
    /// Resample after every successful correction.
    Always,
    /// Resample when the effective sample size drops below
    /// `min_fraction` of the particle count.
    EffectiveSampleSize { min_fraction: f64 },
    /// Resample when the variance of the particle probabilities exceeds
    /// `max_variance`.
    Variance { max_variance: f64 },
}

impl Default for ResamplingTrigger {
    fn default() -> Self {
        ResamplingTrigger::EffectiveSampleSize { min_fraction: 0.5 }
    }
}

impl ResamplingTrigger {
    pub fn should_resample(&self, particles: &[WeightedParticle]) -> bool {
        if particles.is_empty() {
            return false;
        }
        match self {
            ResamplingTrigger::Always => true,
            ResamplingTrigger::EffectiveSampleSize { min_fraction } => {
                effective_sample_size(particles) < min_fraction * particles.len() as f64
            }
            ResamplingTrigger::Variance { max_variance } => {
                probability_variance(particles) > *max_variance
            }
        }
    }
}

/// `1 / sum(p_i^2)`: equals the particle count for a uniform distribution
/// and 1 when a single particle carries all probability.
pub fn effective_sample_size(particles: &[WeightedParticle]) -> f64 {
    let sum_of_squares: f64 = particles.iter().map(|p| p.probability().powi(2)).sum();
    if sum_of_squares > 0.0 {
        1.0 / sum_of_squares
    } else {
        0.0
    }
}

pub fn probability_variance(particles: &[WeightedParticle]) -> f64 {
    if particles.is_empty() {
        return 0.0;
    }
    let n = particles.len() as f64;
    let mean = particles.iter().map(|p| p.probability()).sum::<f64>() / n;
    particles
        .iter()
        .map(|p| (p.probability() - mean).powi(2))
        .sum::<f64>()
        / n
}

/// Low-variance resampling: a single random offset, then `n` evenly spaced
/// pointers into the cumulative probability. Every survivor gets
/// probability `1/n`.
pub fn systematic_resample<R: Rng + ?Sized>(
    particles: &[WeightedParticle],
    rng: &mut R,
) -> Vec<WeightedParticle> {
    let n = particles.len();
    if n == 0 {
        return Vec::new();
    }
    let total: f64 = particles.iter().map(|p| p.probability()).sum();
    if !(total > 0.0 && total.is_finite()) {
        return particles.to_vec();
    }

    let step = total / n as f64;
    let uniform = 1.0 / n as f64;
    let mut u = rng.gen::<f64>() * step;
    let mut i = 0;
    let mut cumsum = particles[0].probability();
    let mut resampled = Vec::with_capacity(n);
    for _ in 0..n {
        while u > cumsum && i + 1 < n {
            i += 1;
            cumsum += particles[i].probability();
        }
        let mut survivor = particles[i].clone();
        survivor.set_probability(uniform);
        resampled.push(survivor);
        u += step;
    }
    resampled
}
