// kickoff_core/src/localization/config.rs

use serde::Deserialize;

use super::{AssociationConfig, EstimateStrategy, ResamplingTrigger, VisibilityConfig};
use crate::error::{EstimationError, Result};
use crate::filtering::PositionFilterConfig;

/// Standard deviations of a planar pose perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoseSpread {
    /// Per ground axis, meters.
    pub position: f64,
    /// Heading, radians.
    pub yaw: f64,
}

/// Every tunable of the particle localizer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LocalizerConfig {
    pub particle_count: usize,
    /// Seed of the localizer's private random generator.
    pub seed: u64,
    /// Spread of the particle cloud around the estimate passed to `reset`.
    pub initial_spread: PoseSpread,
    /// Process noise added to every odometry step.
    pub odometry_noise: PoseSpread,
    /// Heading noise added when an absolute orientation is applied.
    pub rotation_noise: f64,
    /// Width of the Gaussian that scores observation deviations, meters.
    pub observation_sigma: f64,
    pub association: AssociationConfig,
    pub resampling: ResamplingTrigger,
    /// Share of the set replaced by perturbed copies after each correction.
    pub random_particle_fraction: f64,
    pub random_particle_spread: PoseSpread,
    /// Confidence multiplier for every correction without usable observations.
    pub confidence_decay: f64,
    pub estimate: EstimateStrategy,
    pub visibility: VisibilityConfig,
    /// Smoothing applied to the published position.
    pub output_filter: PositionFilterConfig,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            particle_count: 200,
            seed: 0,
            initial_spread: PoseSpread {
                position: 0.3,
                yaw: 0.1,
            },
            odometry_noise: PoseSpread {
                position: 0.01,
                yaw: 0.005,
            },
            rotation_noise: 0.01,
            observation_sigma: 0.3,
            association: AssociationConfig::default(),
            resampling: ResamplingTrigger::default(),
            random_particle_fraction: 0.05,
            random_particle_spread: PoseSpread {
                position: 0.2,
                yaw: 0.05,
            },
            confidence_decay: 0.95,
            estimate: EstimateStrategy::default(),
            visibility: VisibilityConfig::default(),
            output_filter: PositionFilterConfig::MovingAverage { capacity: 3 },
        }
    }
}

impl LocalizerConfig {
    /// Rejects configurations the localizer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(EstimationError::parameter(
                "particle_count",
                "at least one particle is required",
            ));
        }
        let non_negative = [
            ("initial_spread.position", self.initial_spread.position),
            ("initial_spread.yaw", self.initial_spread.yaw),
            ("odometry_noise.position", self.odometry_noise.position),
            ("odometry_noise.yaw", self.odometry_noise.yaw),
            ("rotation_noise", self.rotation_noise),
            ("random_particle_spread.position", self.random_particle_spread.position),
            ("random_particle_spread.yaw", self.random_particle_spread.yaw),
            ("association.ambiguity_margin", self.association.ambiguity_margin),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(EstimationError::parameter(
                    name,
                    format!("must be non-negative, got {value}"),
                ));
            }
        }
        if !(self.observation_sigma > 0.0) {
            return Err(EstimationError::parameter(
                "observation_sigma",
                format!("must be positive, got {}", self.observation_sigma),
            ));
        }
        for (name, value) in [
            ("random_particle_fraction", self.random_particle_fraction),
            ("confidence_decay", self.confidence_decay),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EstimationError::parameter(
                    name,
                    format!("must be within [0, 1], got {value}"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LocalizerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_values_are_named() {
        let config = LocalizerConfig {
            particle_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EstimationError::InvalidParameter {
                name: "particle_count",
                ..
            })
        ));

        let config = LocalizerConfig {
            random_particle_fraction: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LocalizerConfig {
            observation_sigma: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
