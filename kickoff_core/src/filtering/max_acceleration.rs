// kickoff_core/src/filtering/max_acceleration.rs

use nalgebra::Vector3;
use tracing::debug;

use super::{PositionFilter, PositionHistory};
use crate::error::{EstimationError, Result};
use crate::types::Position;

pub const DEFAULT_MAX_SPEED_CHANGE: f64 = 0.02;
pub const DEFAULT_DAMPING: f64 = 0.8;

/// Moving average that rejects single-sample velocity spikes.
///
/// The buffer mean is the candidate. The implied per-cycle speed is the step
/// from the previously reported position to the candidate. If that speed
/// differs from the previous cycle's speed by more than `max_speed_change`,
/// only `damping` of the step is accepted.
#[derive(Debug, Clone)]
pub struct MaxAccelerationFilter {
    history: PositionHistory,
    max_speed_change: f64,
    damping: f64,
    previous: Option<Position>,
    previous_speed: Position,
}

impl MaxAccelerationFilter {
    pub fn new(capacity: usize, max_speed_change: f64, damping: f64) -> Result<Self> {
        if !(max_speed_change >= 0.0) {
            return Err(EstimationError::parameter(
                "max_speed_change",
                format!("must be non-negative, got {max_speed_change}"),
            ));
        }
        if !(0.0..=1.0).contains(&damping) {
            return Err(EstimationError::parameter(
                "damping",
                format!("must be within [0, 1], got {damping}"),
            ));
        }
        Ok(Self {
            history: PositionHistory::new(capacity)?,
            max_speed_change,
            damping,
            previous: None,
            previous_speed: Vector3::zeros(),
        })
    }

    /// The position reported on the last cycle that had an observation.
    pub fn previous(&self) -> Option<&Position> {
        self.previous.as_ref()
    }
}

impl Default for MaxAccelerationFilter {
    fn default() -> Self {
        Self {
            history: PositionHistory::default(),
            max_speed_change: DEFAULT_MAX_SPEED_CHANGE,
            damping: DEFAULT_DAMPING,
            previous: None,
            previous_speed: Vector3::zeros(),
        }
    }
}

impl PositionFilter for MaxAccelerationFilter {
    fn filter_position(
        &mut self,
        new: Option<&Position>,
        _old: Option<&Position>,
        _speed: Option<&Position>,
    ) -> Option<Position> {
        self.history.push(*new?);
        let candidate = self.history.mean()?;

        let result = match self.previous {
            None => candidate,
            Some(previous) => {
                let delta = candidate - previous;
                let speed_change = (delta - self.previous_speed).norm();
                if speed_change > self.max_speed_change {
                    debug!(speed_change, "max-acceleration filter damped a step");
                    previous + delta * self.damping
                } else {
                    candidate
                }
            }
        };

        if let Some(previous) = self.previous {
            self.previous_speed = result - previous;
        }
        self.previous = Some(result);
        Some(result)
    }

    fn reset(&mut self) {
        self.history.clear();
        self.previous = None;
        self.previous_speed = Vector3::zeros();
    }

    fn name(&self) -> &'static str {
        "MaxAcceleration"
    }
}
