// kickoff_core/src/filtering/reset_on_jump.rs

use tracing::debug;

use super::PositionFilter;
use crate::error::{EstimationError, Result};
use crate::types::Position;

/// Wraps another filter and resets it whenever the new sample lies further
/// than `threshold` from the old position, before delegating.
#[derive(Debug, Clone)]
pub struct ResetOnJumpFilter {
    inner: Box<dyn PositionFilter>,
    threshold: f64,
}

impl ResetOnJumpFilter {
    pub fn new(inner: Box<dyn PositionFilter>, threshold: f64) -> Result<Self> {
        if !(threshold >= 0.0) {
            return Err(EstimationError::parameter(
                "threshold",
                format!("must be non-negative, got {threshold}"),
            ));
        }
        Ok(Self { inner, threshold })
    }

    pub fn inner(&self) -> &dyn PositionFilter {
        self.inner.as_ref()
    }
}

impl PositionFilter for ResetOnJumpFilter {
    fn filter_position(
        &mut self,
        new: Option<&Position>,
        old: Option<&Position>,
        speed: Option<&Position>,
    ) -> Option<Position> {
        if let (Some(new), Some(old)) = (new, old) {
            let jump = (new - old).norm();
            if jump > self.threshold {
                debug!(jump, inner = self.inner.name(), "resetting filter after jump");
                self.inner.reset();
            }
        }
        self.inner.filter_position(new, old, speed)
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn velocity_estimate(&self) -> Option<Position> {
        self.inner.velocity_estimate()
    }

    fn name(&self) -> &'static str {
        "ResetOnJump"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::MovingAverageFilter;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_jump_resets_wrapped_filter() {
        let mut filter =
            ResetOnJumpFilter::new(Box::new(MovingAverageFilter::default()), 1.0).unwrap();
        let origin = Vector3::zeros();
        for _ in 0..4 {
            filter.filter_position(Some(&origin), Some(&origin), None);
        }

        let far = Vector3::new(5.0, 0.0, 0.0);
        let out = filter.filter_position(Some(&far), Some(&origin), None);
        assert_eq!(out, Some(far));
    }

    #[test]
    fn test_small_step_is_delegated_without_reset() {
        let mut filter =
            ResetOnJumpFilter::new(Box::new(MovingAverageFilter::default()), 1.0).unwrap();
        let origin = Vector3::zeros();
        filter.filter_position(Some(&origin), None, None);

        let near = Vector3::new(0.5, 0.0, 0.0);
        let out = filter.filter_position(Some(&near), Some(&origin), None).unwrap();
        assert_abs_diff_eq!(out.x, 0.25, epsilon = 1e-12);
        assert_eq!(filter.inner().name(), "MovingAverage");
    }
}
