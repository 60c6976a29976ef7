// kickoff_core/src/localization/mod.rs

//! Feature-based Monte Carlo self-localization.

use std::collections::HashMap;
use std::fmt::Debug;

use crate::map::FeatureMap;
use crate::perception::{LineObservation, PointObservation};
use crate::types::{Orientation, Pose, Time};

mod association;
mod config;
mod engine;
mod estimate;
mod importance;
mod info;
mod particle;
mod resampling;
mod sensor;
mod visibility;

pub use association::{associate_lines, associate_points, AssociationConfig};
pub use config::{LocalizerConfig, PoseSpread};
pub use engine::{LocalizerStatus, ParticleLocalizer};
pub use estimate::EstimateStrategy;
pub use importance::{normalize_importance, observation_likelihood};
pub use info::LocalizationInfo;
pub use particle::WeightedParticle;
pub use resampling::{
    effective_sample_size, probability_variance, systematic_resample, ResamplingTrigger,
};
pub use sensor::{
    LocalizationSensor, SensorKind, CAMERA_SENSOR, INERTIAL_SENSOR, ODOMETRY_SENSOR,
};
pub use visibility::{FieldOfViewVisibility, IgnoreVisibility, VisibilityConfig, VisibilityModel};

/// The contract for any algorithm that estimates the agent's own pose.
///
/// All observations are expressed in the root-body frame. Nothing here fails
/// at runtime: missing input turns a call into a no-op that returns `false`.
pub trait Localizer: Debug + Send + Sync {
    /// Re-enters tracking around `initial_pose` (identity if `None`).
    fn reset(&mut self, time: Time, initial_pose: Option<&Pose>);

    /// Sets the camera pose on the root body, used to place viewing rays.
    fn set_camera_mount(&mut self, camera_to_root: &Pose);

    /// Applies the motion since the previous call.
    ///
    /// # Arguments
    /// * `odometry`: Root-frame displacement since the last call.
    /// * `orientation_estimate`: Absolute orientation, applied independently of odometry.
    /// * `camera_height`: Height of the camera above the ground.
    fn predict(
        &mut self,
        time: Time,
        odometry: Option<&Pose>,
        orientation_estimate: Option<&Orientation>,
        camera_height: f64,
    ) -> bool;

    /// Weighs the pose hypotheses against this cycle's observations.
    fn correct(
        &mut self,
        time: Time,
        map: &FeatureMap,
        point_observations: &[PointObservation],
        line_observations: &[LineObservation],
        orientation_estimate: Option<&Orientation>,
        camera_height: f64,
    ) -> bool;

    /// The most recently published estimate.
    fn get_state(&self) -> &LocalizationInfo;

    fn sensors(&self) -> &HashMap<String, LocalizationSensor>;
}
