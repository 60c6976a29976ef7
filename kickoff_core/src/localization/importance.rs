// kickoff_core/src/localization/importance.rs

use tracing::warn;

use super::WeightedParticle;
use crate::map::FeatureMap;
use crate::perception::{LineObservation, PointObservation};
use crate::types::Pose;

/// Likelihood of the assigned observations as seen from `pose`.
///
/// The deviations of all observations are combined into their mean squared
/// error and scored with a Gaussian of width `sigma`, so the result is in
/// `(0, 1]`. Non-finite deviations are not scored. Returns `None` if no
/// observation could be scored.
pub fn observation_likelihood(
    pose: &Pose,
    map: &FeatureMap,
    points: &[PointObservation],
    lines: &[LineObservation],
    sigma: f64,
) -> Option<f64> {
    let mut squared_sum = 0.0;
    let mut count = 0usize;

    for observation in points {
        if let Some(feature) = observation.name().and_then(|name| map.point(name)) {
            let deviation = observation.deviation(pose, feature);
            if deviation.is_finite() {
                squared_sum += deviation.powi(2);
                count += 1;
            }
        }
    }
    for observation in lines {
        if let Some(feature) = observation.name().and_then(|name| map.line(name)) {
            let deviation = observation.deviation(pose, feature);
            if deviation.is_finite() {
                squared_sum += deviation.powi(2);
                count += 1;
            }
        }
    }

    if count == 0 {
        return None;
    }
    let mse = squared_sum / count as f64;
    Some((-0.5 * mse / (sigma * sigma)).exp())
}

/// Divides every particle's weight by `weight_sum` to obtain its probability.
///
/// Returns `false` and leaves all probabilities untouched if the sum is not
/// a positive finite number.
pub fn normalize_importance(particles: &mut [WeightedParticle], weight_sum: f64) -> bool {
    if !(weight_sum > 0.0 && weight_sum.is_finite()) {
        warn!(weight_sum, "degenerate particle weights, normalization skipped");
        return false;
    }
    for particle in particles.iter_mut() {
        particle.set_probability(particle.weight() / weight_sum);
    }
    true
}
