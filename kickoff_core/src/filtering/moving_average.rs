// kickoff_core/src/filtering/moving_average.rs

use super::{PositionFilter, PositionHistory};
use crate::error::Result;
use crate::types::Position;

/// Unweighted mean over the last `capacity` samples.
#[derive(Debug, Clone)]
pub struct MovingAverageFilter {
    history: PositionHistory,
}

impl MovingAverageFilter {
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            history: PositionHistory::new(capacity)?,
        })
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }
}

impl Default for MovingAverageFilter {
    fn default() -> Self {
        Self {
            history: PositionHistory::default(),
        }
    }
}

impl PositionFilter for MovingAverageFilter {
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
        "MovingAverage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_identical_samples_converge_exactly() {
        let mut filter = MovingAverageFilter::default();
        let v = Vector3::new(1.25, -3.5, 0.11);
        let mut out = None;
        for _ in 0..12 {
            out = filter.filter_position(Some(&v), None, None);
        }
        assert_eq!(out, Some(v));
    }

    #[test]
    fn test_missing_sample_does_not_touch_history() {
        let mut filter = MovingAverageFilter::new(3).unwrap();
        filter.filter_position(Some(&Vector3::new(1.0, 0.0, 0.0)), None, None);
        assert_eq!(filter.filter_position(None, None, None), None);
        assert_eq!(filter.history().len(), 1);

        let out = filter
            .filter_position(Some(&Vector3::new(3.0, 0.0, 0.0)), None, None)
            .unwrap();
        assert_abs_diff_eq!(out.x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reset_then_first_sample_is_returned() {
        let mut filter = MovingAverageFilter::default();
        for x in 0..5 {
            filter.filter_position(Some(&Vector3::new(x as f64, 0.0, 0.0)), None, None);
        }
        filter.reset();
        let p = Vector3::new(-4.0, 2.0, 0.5);
        assert_eq!(filter.filter_position(Some(&p), None, None), Some(p));
    }

    #[test]
    fn test_oldest_sample_is_evicted() {
        let mut filter = MovingAverageFilter::new(2).unwrap();
        for x in [10.0, 0.0, 2.0] {
            filter.filter_position(Some(&Vector3::new(x, 0.0, 0.0)), None, None);
        }
        assert_abs_diff_eq!(filter.history().mean().unwrap().x, 1.0, epsilon = 1e-12);
    }
}
