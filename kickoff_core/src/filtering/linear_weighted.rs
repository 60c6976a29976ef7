// kickoff_core/src/filtering/linear_weighted.rs

use super::{PositionFilter, PositionHistory};
use crate::error::Result;
use crate::types::Position;

/// Weighted mean over the history where sample `i` (0 = newest) weighs `n - i`,
/// normalized by the triangular number `n(n+1)/2`.
#[derive(Debug, Clone)]
pub struct LinearWeightedFilter {
    history: PositionHistory,
}

impl LinearWeightedFilter {
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            history: PositionHistory::new(capacity)?,
        })
    }
}

impl Default for LinearWeightedFilter {
    fn default() -> Self {
        Self {
            history: PositionHistory::default(),
        }
    }
}

impl PositionFilter for LinearWeightedFilter {
    fn filter_position(
        &mut self,
        new: Option<&Position>,
        _old: Option<&Position>,
        _speed: Option<&Position>,
    ) -> Option<Position> {
        self.history.push(*new?);
        self.history.linear_weighted_mean()
    }

    fn reset(&mut self) {
        self.history.clear();
    }

    fn name(&self) -> &'static str {
        "LinearWeighted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_single_sample_is_returned() {
        let mut filter = LinearWeightedFilter::default();
        let p = Vector3::new(1.0, 0.0, 0.0);
        assert_eq!(filter.filter_position(Some(&p), None, None), Some(p));
    }

    #[test]
    fn test_two_samples_weighted_two_to_one() {
        let mut filter = LinearWeightedFilter::default();
        filter.filter_position(Some(&Vector3::zeros()), None, None);
        let out = filter
            .filter_position(Some(&Vector3::new(2.0, 0.0, 0.0)), None, None)
            .unwrap();
        assert_abs_diff_eq!(out.x, 1.333_333_333, epsilon = 1e-6);
        assert_abs_diff_eq!(out.y, 0.0);
    }

    #[test]
    fn test_full_buffer_matches_closed_form() {
        let mut filter = LinearWeightedFilter::new(3).unwrap();
        // Oldest to newest: 1, 2, 3, 4 (the 1 gets evicted).
        let mut out = None;
        for x in [1.0, 2.0, 3.0, 4.0] {
            out = filter.filter_position(Some(&Vector3::new(x, 0.0, 0.0)), None, None);
        }
        // (3*4 + 2*3 + 1*2) / 6
        assert_abs_diff_eq!(out.unwrap().x, 20.0 / 6.0, epsilon = 1e-12);
    }
}
