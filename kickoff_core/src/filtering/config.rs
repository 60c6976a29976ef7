// kickoff_core/src/filtering/config.rs

use serde::Deserialize;

use super::history::DEFAULT_HISTORY_CAPACITY;
use super::low_frequency::DEFAULT_JUMP_THRESHOLD;
use super::max_acceleration::{DEFAULT_DAMPING, DEFAULT_MAX_SPEED_CHANGE};
use super::{
    BallKalmanNoise, BallPhysics, BouncingBallFilter, LinearWeightedFilter, LowFrequencyFilter,
    MaxAccelerationFilter, MovingAverageFilter, PassthroughFilter, PositionFilter,
    ResetOnJumpFilter, VariableHorizonFilter,
};
use crate::error::Result;

fn default_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}
fn default_jump_threshold() -> f64 {
    DEFAULT_JUMP_THRESHOLD
}
fn default_max_speed_change() -> f64 {
    DEFAULT_MAX_SPEED_CHANGE
}
fn default_damping() -> f64 {
    DEFAULT_DAMPING
}
fn default_lag_compensation() -> bool {
    true
}
fn default_horizon() -> f64 {
    1.0
}

/// Selects a position filter variant at configuration time.
///
/// ```toml
/// type = "ResetOnJump"
/// threshold = 1.0
/// inner = { type = "BouncingBall" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "PascalCase")]
pub enum PositionFilterConfig {
    Passthrough,
    MovingAverage {
        #[serde(default = "default_capacity")]
        capacity: usize,
    },
    LinearWeighted {
        #[serde(default = "default_capacity")]
        capacity: usize,
    },
    LowFrequency {
        #[serde(default = "default_capacity")]
        capacity: usize,
        #[serde(default = "default_jump_threshold")]
        jump_threshold: f64,
        #[serde(default = "default_lag_compensation")]
        lag_compensation: bool,
    },
    MaxAcceleration {
        #[serde(default = "default_capacity")]
        capacity: usize,
        #[serde(default = "default_max_speed_change")]
        max_speed_change: f64,
        #[serde(default = "default_damping")]
        damping: f64,
    },
    BouncingBall {
        #[serde(default)]
        physics: BallPhysics,
        #[serde(default)]
        noise: BallKalmanNoise,
    },
    ResetOnJump {
        threshold: f64,
        inner: Box<PositionFilterConfig>,
    },
    VariableHorizon {
        min_window: usize,
        max_window: usize,
        #[serde(default = "default_horizon")]
        horizon: f64,
    },
}

impl Default for PositionFilterConfig {
    fn default() -> Self {
        PositionFilterConfig::MovingAverage {
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl PositionFilterConfig {
    /// Constructs the configured filter. Invalid parameters are reported here
    /// and never at filtering time.
    pub fn build(&self) -> Result<Box<dyn PositionFilter>> {
        let filter: Box<dyn PositionFilter> = match self {
            PositionFilterConfig::Passthrough => Box::new(PassthroughFilter),
            PositionFilterConfig::MovingAverage { capacity } => {
                Box::new(MovingAverageFilter::new(*capacity)?)
            }
            PositionFilterConfig::LinearWeighted { capacity } => {
                Box::new(LinearWeightedFilter::new(*capacity)?)
            }
            PositionFilterConfig::LowFrequency {
                capacity,
                jump_threshold,
                lag_compensation,
            } => Box::new(
                LowFrequencyFilter::new(*capacity, *jump_threshold)?
                    .with_lag_compensation(*lag_compensation),
            ),
            PositionFilterConfig::MaxAcceleration {
                capacity,
                max_speed_change,
                damping,
            } => Box::new(MaxAccelerationFilter::new(
                *capacity,
                *max_speed_change,
                *damping,
            )?),
            PositionFilterConfig::BouncingBall { physics, noise } => {
                Box::new(BouncingBallFilter::new(*physics, *noise)?)
            }
            PositionFilterConfig::ResetOnJump { threshold, inner } => {
                Box::new(ResetOnJumpFilter::new(inner.build()?, *threshold)?)
            }
            PositionFilterConfig::VariableHorizon {
                min_window,
                max_window,
                horizon,
            } => Box::new(VariableHorizonFilter::new(
                *min_window,
                *max_window,
                *horizon,
            )?),
        };
        Ok(filter)
    }

    pub fn get_type_str(&self) -> &str {
        match self {
            PositionFilterConfig::Passthrough => "Passthrough",
            PositionFilterConfig::MovingAverage { .. } => "MovingAverage",
            PositionFilterConfig::LinearWeighted { .. } => "LinearWeighted",
            PositionFilterConfig::LowFrequency { .. } => "LowFrequency",
            PositionFilterConfig::MaxAcceleration { .. } => "MaxAcceleration",
            PositionFilterConfig::BouncingBall { .. } => "BouncingBall",
            PositionFilterConfig::ResetOnJump { .. } => "ResetOnJump",
            PositionFilterConfig::VariableHorizon { .. } => "VariableHorizon",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstimationError;
    use nalgebra::Vector3;

    #[test]
    fn test_build_reports_filter_names() {
        let configs = [
            PositionFilterConfig::Passthrough,
            PositionFilterConfig::default(),
            PositionFilterConfig::LinearWeighted { capacity: 3 },
            PositionFilterConfig::BouncingBall {
                physics: BallPhysics::default(),
                noise: BallKalmanNoise::default(),
            },
            PositionFilterConfig::VariableHorizon {
                min_window: 1,
                max_window: 8,
                horizon: 0.5,
            },
        ];
        for config in configs {
            let filter = config.build().unwrap();
            assert_eq!(filter.name(), config.get_type_str());
        }
    }

    #[test]
    fn test_zero_capacity_fails_at_construction() {
        let result = PositionFilterConfig::MovingAverage { capacity: 0 }.build();
        assert!(matches!(
            result,
            Err(EstimationError::InvalidCapacity { capacity: 0 })
        ));
    }

    #[test]
    fn test_nested_decorator_builds_inner_filter() {
        let config = PositionFilterConfig::ResetOnJump {
            threshold: 0.5,
            inner: Box::new(PositionFilterConfig::Passthrough),
        };
        let mut filter = config.build().unwrap();
        let p = Vector3::new(1.0, 1.0, 0.0);
        assert_eq!(filter.filter_position(Some(&p), None, None), Some(p));

        let bad = PositionFilterConfig::ResetOnJump {
            threshold: 0.5,
            inner: Box::new(PositionFilterConfig::LinearWeighted { capacity: 0 }),
        };
        assert!(bad.build().is_err());
    }

    #[test]
    fn test_boxed_filters_clone_independently() {
        let mut original = PositionFilterConfig::default().build().unwrap();
        original.filter_position(Some(&Vector3::new(2.0, 0.0, 0.0)), None, None);
        let mut copy = original.clone();
        copy.reset();
        let zero = Vector3::zeros();
        let from_original = original.filter_position(Some(&zero), None, None).unwrap();
        let from_copy = copy.filter_position(Some(&zero), None, None).unwrap();
        assert_eq!(from_original.x, 1.0);
        assert_eq!(from_copy.x, 0.0);
    }
}
