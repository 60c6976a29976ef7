// kickoff_core/src/localization/estimate.rs

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::Deserialize;

use super::WeightedParticle;
use crate::types::{tilt_of, Pose};

/// How the published pose is derived from the particle set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EstimateStrategy {
    /// The single most probable particle.
    BestParticle,
    /// Probability-weighted mean position and circular mean heading.
    #[default]
    WeightedAverage,
}

impl EstimateStrategy {
    pub fn estimate(&self, particles: &[WeightedParticle]) -> Option<Pose> {
        let best = particles
            .iter()
            .max_by(|a, b| a.probability().total_cmp(&b.probability()))?;

        match self {
            EstimateStrategy::BestParticle => Some(*best.pose()),
            EstimateStrategy::WeightedAverage => {
                let total: f64 = particles.iter().map(|p| p.probability()).sum();
                if !(total > 0.0 && total.is_finite()) {
                    return Some(*best.pose());
                }

                let mut position = Vector3::zeros();
                let (mut sin_sum, mut cos_sum) = (0.0, 0.0);
                for particle in particles {
                    let w = particle.probability() / total;
                    position += particle.position() * w;
                    let yaw = particle.yaw();
                    sin_sum += w * yaw.sin();
                    cos_sum += w * yaw.cos();
                }
                let yaw = sin_sum.atan2(cos_sum);
                let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw)
                    * tilt_of(best.orientation());

                Some(Isometry3::from_parts(Translation3::from(position), rotation))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{planar_pose, yaw_of};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_heading_average_wraps_around_pi() {
        let particles = vec![
            WeightedParticle::new(planar_pose(0.0, 0.0, PI - 0.1), 0.5),
            WeightedParticle::new(planar_pose(2.0, 0.0, -PI + 0.1), 0.5),
        ];
        let pose = EstimateStrategy::WeightedAverage.estimate(&particles).unwrap();
        assert_abs_diff_eq!(pose.translation.vector.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(yaw_of(&pose.rotation).abs(), PI, epsilon = 1e-9);
    }

    #[test]
    fn test_best_particle_picks_highest_probability() {
        let particles = vec![
            WeightedParticle::new(planar_pose(0.0, 0.0, 0.0), 0.2),
            WeightedParticle::new(planar_pose(5.0, 1.0, 0.0), 0.8),
        ];
        let pose = EstimateStrategy::BestParticle.estimate(&particles).unwrap();
        assert_eq!(pose.translation.vector, Vector3::new(5.0, 1.0, 0.0));
        assert!(EstimateStrategy::BestParticle.estimate(&[]).is_none());
    }
}
