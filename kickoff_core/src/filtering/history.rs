// kickoff_core/src/filtering/history.rs

use std::collections::VecDeque;

use nalgebra::Vector3;

use crate::error::{EstimationError, Result};
use crate::types::Position;

pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Bounded buffer of past positions, newest first.
///
/// Index 0 is the most recent sample. Pushing past capacity evicts the oldest.
#[derive(Debug, Clone)]
pub struct PositionHistory {
    samples: VecDeque<Position>,
    capacity: usize,
}

impl PositionHistory {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(EstimationError::InvalidCapacity { capacity });
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn push(&mut self, sample: Position) {
        self.samples.push_front(sample);
        self.samples.truncate(self.capacity);
    }

    pub fn newest(&self) -> Option<&Position> {
        self.samples.front()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Changes the capacity, dropping the oldest samples immediately if the
    /// buffer is now too long. A capacity of 0 is raised to 1.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.samples.truncate(self.capacity);
    }

    /// Samples from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.samples.iter()
    }

    /// Unweighted mean of the buffer.
    pub fn mean(&self) -> Option<Position> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: Position = self.samples.iter().sum();
        Some(sum / self.samples.len() as f64)
    }

    /// Mean with sample `i` (0 = newest) weighted by `n - i`.
    pub fn linear_weighted_mean(&self) -> Option<Position> {
        let n = self.samples.len();
        if n == 0 {
            return None;
        }
        let weighted: Position = self
            .samples
            .iter()
            .enumerate()
            .map(|(i, p)| p * (n - i) as f64)
            .sum();
        let triangular = (n * (n + 1)) as f64 / 2.0;
        Some(weighted / triangular)
    }

    /// Average displacement per sample step across the buffer.
    pub fn average_velocity(&self) -> Position {
        match (self.samples.front(), self.samples.back()) {
            (Some(newest), Some(oldest)) if self.samples.len() > 1 => {
                (newest - oldest) / (self.samples.len() - 1) as f64
            }
            _ => Vector3::zeros(),
        }
    }
}

impl Default for PositionHistory {
    fn default() -> Self {
        Self {
            samples: VecDeque::with_capacity(DEFAULT_HISTORY_CAPACITY),
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert_eq!(
            PositionHistory::new(0).unwrap_err(),
            EstimationError::InvalidCapacity { capacity: 0 }
        );
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut history = PositionHistory::new(2).unwrap();
        history.push(Vector3::new(1.0, 0.0, 0.0));
        history.push(Vector3::new(2.0, 0.0, 0.0));
        history.push(Vector3::new(3.0, 0.0, 0.0));
        let xs: Vec<f64> = history.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![3.0, 2.0]);
    }

    #[test]
    fn test_linear_weighted_mean_weights_newest_most() {
        let mut history = PositionHistory::new(5).unwrap();
        history.push(Vector3::new(0.0, 0.0, 0.0));
        history.push(Vector3::new(2.0, 0.0, 0.0));
        let mean = history.linear_weighted_mean().unwrap();
        assert_abs_diff_eq!(mean.x, 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shrinking_capacity_trims_oldest() {
        let mut history = PositionHistory::new(4).unwrap();
        for x in 0..4 {
            history.push(Vector3::new(x as f64, 0.0, 0.0));
        }
        history.set_capacity(2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.newest().unwrap().x, 3.0);
        assert_abs_diff_eq!(history.average_velocity().x, 1.0, epsilon = 1e-12);
    }
}
