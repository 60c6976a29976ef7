// kickoff_core/src/filtering/variable_horizon.rs

use super::{PositionFilter, PositionHistory};
use crate::error::{EstimationError, Result};
use crate::types::Position;

/// Moving average whose window length follows a `horizon` in `[0, 1]`,
/// interpolated linearly between `min_window` and `max_window`.
#[derive(Debug, Clone)]
pub struct VariableHorizonFilter {
    history: PositionHistory,
    min_window: usize,
    max_window: usize,
    horizon: f64,
}

impl VariableHorizonFilter {
    pub fn new(min_window: usize, max_window: usize, horizon: f64) -> Result<Self> {
        if min_window == 0 || min_window > max_window {
            return Err(EstimationError::InvalidHorizon {
                min: min_window,
                max: max_window,
            });
        }
        let mut filter = Self {
            history: PositionHistory::new(max_window)?,
            min_window,
            max_window,
            horizon: 1.0,
        };
        filter.set_horizon(horizon);
        Ok(filter)
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    pub fn window(&self) -> usize {
        self.history.capacity()
    }

    /// Recomputes the window from `horizon` (clamped to `[0, 1]`).
    /// Shrinking drops the oldest samples immediately.
    pub fn set_horizon(&mut self, horizon: f64) {
        self.horizon = if horizon.is_finite() {
            horizon.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let span = (self.max_window - self.min_window) as f64;
        let window = self.min_window + (self.horizon * span).round() as usize;
        self.history.set_capacity(window);
    }
}

impl PositionFilter for VariableHorizonFilter {
    fn filter_position(
        &mut self,
        new: Option<&Position>,
        _old: Option<&Position>,
        _speed: Option<&Position>,
    ) -> Option<Position> {
        self.history.push(*new?);
        self.history.mean()
    }

    fn reset(&mut self) {
        self.history.clear();
    }

    fn name(&self) -> &'static str {
        "VariableHorizon"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_window_interpolates_between_bounds() {
        let mut filter = VariableHorizonFilter::new(2, 10, 0.0).unwrap();
        assert_eq!(filter.window(), 2);
        filter.set_horizon(0.5);
        assert_eq!(filter.window(), 6);
        filter.set_horizon(7.0);
        assert_eq!(filter.window(), 10);
        assert_eq!(filter.horizon(), 1.0);
    }

    #[test]
    fn test_shrinking_trims_oldest_immediately() {
        let mut filter = VariableHorizonFilter::new(1, 4, 1.0).unwrap();
        for x in [0.0, 0.0, 0.0, 4.0] {
            filter.filter_position(Some(&Vector3::new(x, 0.0, 0.0)), None, None);
        }
        filter.set_horizon(0.0);
        let out = filter
            .filter_position(Some(&Vector3::new(6.0, 0.0, 0.0)), None, None)
            .unwrap();
        assert_abs_diff_eq!(out.x, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_windows_are_rejected() {
        assert!(matches!(
            VariableHorizonFilter::new(0, 4, 0.5),
            Err(EstimationError::InvalidHorizon { .. })
        ));
        assert!(VariableHorizonFilter::new(5, 4, 0.5).is_err());
    }
}
