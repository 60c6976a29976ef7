// kickoff_core/src/localization/particle.rs

use nalgebra::{UnitQuaternion, Vector3};

use crate::types::{yaw_of, Orientation, Pose, Position};

/// One pose hypothesis of the root body in the field frame.
///
/// `weight` is the unnormalized importance from the last correction,
/// `probability` its normalized share of the whole particle set.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedParticle {
    pose: Pose,
    weight: f64,
    probability: f64,
}

impl WeightedParticle {
    pub fn new(pose: Pose, probability: f64) -> Self {
        Self {
            pose,
            weight: 0.0,
            probability,
        }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn position(&self) -> Position {
        self.pose.translation.vector
    }

    pub fn orientation(&self) -> &Orientation {
        &self.pose.rotation
    }

    pub fn yaw(&self) -> f64 {
        yaw_of(&self.pose.rotation)
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub fn set_probability(&mut self, probability: f64) {
        self.probability = probability;
    }

    /// Applies a planar odometry step expressed in the particle's own heading:
    /// the ground translation is rotated by the current yaw, then the heading
    /// advances by `yaw_delta`. Roll and pitch are kept.
    pub fn update_motion(&mut self, translation: &Position, yaw_delta: f64) {
        let heading = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.yaw());
        let step = heading * Vector3::new(translation.x, translation.y, 0.0);
        self.pose.translation.vector += step;
        self.pose.rotation =
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw_delta) * self.pose.rotation;
    }

    /// Replaces the orientation with an absolute estimate, leaving the
    /// position untouched.
    pub fn update_rotation(&mut self, orientation: &Orientation) {
        self.pose.rotation = *orientation;
    }

    /// Sets the height of the root body above the ground.
    pub fn set_height(&mut self, height: f64) {
        self.pose.translation.vector.z = height;
    }
}
