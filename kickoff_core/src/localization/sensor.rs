// kickoff_core/src/localization/sensor.rs

use crate::types::Time;

pub const ODOMETRY_SENSOR: &str = "odometry";
pub const INERTIAL_SENSOR: &str = "inertial";
pub const CAMERA_SENSOR: &str = "camera";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Odometry,
    Inertial,
    Camera,
}

/// Bookkeeping for one input the localizer consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizationSensor {
    pub kind: SensorKind,
    /// Standard deviation the localizer assumes for this input.
    pub noise: f64,
    /// Number of cycles in which this input contributed.
    pub updates: u64,
    pub last_update: Option<Time>,
}

impl LocalizationSensor {
    pub fn new(kind: SensorKind, noise: f64) -> Self {
        Self {
            kind,
            noise,
            updates: 0,
            last_update: None,
        }
    }

    pub(crate) fn record(&mut self, time: Time) {
        self.updates += 1;
        self.last_update = Some(time);
    }
}
