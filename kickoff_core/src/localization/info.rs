// kickoff_core/src/localization/info.rs

use crate::types::{yaw_of, Orientation, Pose, Position, Time};

/// Published localization result. Handed out by value; readers never see a
/// half-updated estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizationInfo {
    /// Time of the correction that produced this estimate.
    pub time: Time,
    /// Smoothed best estimate of the root pose in the field frame.
    pub localized_pose: Pose,
    /// The best estimate's position before output smoothing.
    pub unfiltered_position: Position,
    /// In `[0, 1]`. Mean particle likelihood after the last successful
    /// correction, decayed on every cycle without one.
    pub confidence: f64,
}

impl LocalizationInfo {
    pub fn new(time: Time, pose: Pose, confidence: f64) -> Self {
        Self {
            time,
            localized_pose: pose,
            unfiltered_position: pose.translation.vector,
            confidence,
        }
    }

    pub fn localized_position(&self) -> Position {
        self.localized_pose.translation.vector
    }

    pub fn localized_orientation(&self) -> &Orientation {
        &self.localized_pose.rotation
    }

    pub fn heading(&self) -> f64 {
        yaw_of(&self.localized_pose.rotation)
    }

    pub fn is_finite(&self) -> bool {
        self.localized_pose.translation.vector.iter().all(|v| v.is_finite())
            && self.localized_pose.rotation.coords.iter().all(|v| v.is_finite())
            && self.unfiltered_position.iter().all(|v| v.is_finite())
            && self.confidence.is_finite()
    }
}

impl Default for LocalizationInfo {
    fn default() -> Self {
        Self::new(0.0, Pose::identity(), 0.0)
    }
}
