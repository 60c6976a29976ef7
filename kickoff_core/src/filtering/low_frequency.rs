// kickoff_core/src/filtering/low_frequency.rs

use tracing::debug;

use super::{PositionFilter, PositionHistory};
use crate::error::{EstimationError, Result};
use crate::types::Position;

pub const DEFAULT_JUMP_THRESHOLD: f64 = 0.2;

/// Lag-compensated average that lets genuine jumps through.
///
/// The output is the buffer mean shifted forward by the buffer's average
/// per-sample velocity times half the buffer length, so a steadily moving
/// target is not dragged behind. That shift is computed from the oldest and
/// newest samples, so the output carries about half of the newest sample's
/// noise on top of the averaged noise. With `lag_compensation` off the output
/// is the plain buffer mean. When a new sample lands further than `jump_threshold` from where the
/// previous sample would have moved to, the history is reseeded with only the
/// previous sample, and the jump passes through almost unfiltered.
#[derive(Debug, Clone)]
pub struct LowFrequencyFilter {
    history: PositionHistory,
    jump_threshold: f64,
    lag_compensation: bool,
}

impl LowFrequencyFilter {
    pub fn new(capacity: usize, jump_threshold: f64) -> Result<Self> {
        if !(jump_threshold >= 0.0) {
            return Err(EstimationError::parameter(
                "jump_threshold",
                format!("must be non-negative, got {jump_threshold}"),
            ));
        }
        Ok(Self {
            history: PositionHistory::new(capacity)?,
            jump_threshold,
            lag_compensation: true,
        })
    }

    /// Switches the forward shift of the output on or off.
    pub fn with_lag_compensation(mut self, enabled: bool) -> Self {
        self.lag_compensation = enabled;
        self
    }
}

impl Default for LowFrequencyFilter {
    fn default() -> Self {
        Self {
            history: PositionHistory::default(),
            jump_threshold: DEFAULT_JUMP_THRESHOLD,
            lag_compensation: true,
        }
    }
}

impl PositionFilter for LowFrequencyFilter {
    fn filter_position(
        &mut self,
        new: Option<&Position>,
        _old: Option<&Position>,
        _speed: Option<&Position>,
    ) -> Option<Position> {
        let new = *new?;

        if let Some(previous) = self.history.newest().copied() {
            let extrapolated = previous + self.history.average_velocity();
            let deviation = (new - extrapolated).norm();
            if deviation > self.jump_threshold {
                debug!(deviation, "low-frequency filter reseeded after jump");
                self.history.clear();
                self.history.push(previous);
            }
        }
        self.history.push(new);

        let mean = self.history.mean()?;
        if !self.lag_compensation {
            return Some(mean);
        }
        let lag = (self.history.len() - 1) as f64 / 2.0;
        Some(mean + self.history.average_velocity() * lag)
    }

    fn reset(&mut self) {
        self.history.clear();
    }

    fn name(&self) -> &'static str {
        "LowFrequency"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_constant_velocity_has_no_lag() {
        let mut filter = LowFrequencyFilter::default();
        let mut out = Vector3::zeros();
        for i in 0..8 {
            let p = Vector3::new(0.05 * i as f64, 0.0, 0.0);
            out = filter.filter_position(Some(&p), None, None).unwrap();
        }
        assert_abs_diff_eq!(out.x, 0.35, epsilon = 1e-9);
    }

    #[test]
    fn test_plain_mean_without_lag_compensation() {
        let mut filter = LowFrequencyFilter::default().with_lag_compensation(false);
        let mut out = Vector3::zeros();
        for i in 0..8 {
            let p = Vector3::new(0.05 * i as f64, 0.0, 0.0);
            out = filter.filter_position(Some(&p), None, None).unwrap();
        }
        // Mean of the last five samples 0.15..=0.35.
        assert_abs_diff_eq!(out.x, 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_jump_passes_through_after_reseed() {
        let mut filter = LowFrequencyFilter::default();
        for _ in 0..5 {
            filter.filter_position(Some(&Vector3::zeros()), None, None);
        }
        let jumped = Vector3::new(3.0, 0.0, 0.0);
        let out = filter.filter_position(Some(&jumped), None, None).unwrap();
        // History is [jumped, previous]: the mean is shifted forward by half a step.
        assert_abs_diff_eq!(out.x, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_small_noise_is_averaged() {
        let mut filter = LowFrequencyFilter::default();
        filter.filter_position(Some(&Vector3::new(0.0, 0.0, 0.0)), None, None);
        filter.filter_position(Some(&Vector3::new(0.0, 0.1, 0.0)), None, None);
        let out = filter
            .filter_position(Some(&Vector3::new(0.0, 0.0, 0.0)), None, None)
            .unwrap();
        // Within threshold, so the three samples stay together.
        assert!(out.y.abs() < 0.1);
    }

    #[test]
    fn test_identical_samples_and_reset() {
        let mut filter = LowFrequencyFilter::new(4, 0.2).unwrap();
        let v = Vector3::new(1.0, 2.0, 3.0);
        for _ in 0..6 {
            filter.filter_position(Some(&v), None, None);
        }
        assert_eq!(filter.filter_position(Some(&v), None, None), Some(v));
        filter.reset();
        let p = Vector3::new(9.0, 9.0, 0.0);
        assert_eq!(filter.filter_position(Some(&p), None, None), Some(p));
    }
}
