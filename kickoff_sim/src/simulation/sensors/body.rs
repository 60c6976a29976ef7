// kickoff_sim/src/simulation/sensors/body.rs

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

use kickoff_core::types::{yaw_of, Orientation, Pose};
use kickoff_core::world_model::{BodyModel, InertialSensor};

use crate::simulation::config::{NoiseConfig, RobotConfig};
use crate::simulation::core::prng::SimulationRng;

/// Camera pose on the root body: the configured offset, pitched down.
pub fn camera_mount(config: &RobotConfig) -> Pose {
    Isometry3::from_parts(
        Translation3::from(config.camera_offset()),
        UnitQuaternion::from_euler_angles(0.0, config.camera_pitch, 0.0),
    )
}

/// Body state reported to the world model for one cycle.
#[derive(Debug, Clone)]
pub struct SimBody {
    camera_to_root: Pose,
    odometry: Option<Pose>,
    camera_height: f64,
}

impl SimBody {
    /// Corrupts the true displacement with the configured odometry noise.
    pub fn new(
        camera_to_root: Pose,
        camera_height: f64,
        true_delta: &Pose,
        noise: &NoiseConfig,
        rng: &mut SimulationRng,
    ) -> Self {
        let translation = true_delta.translation.vector
            + Vector3::new(
                rng.gaussian(noise.odometry_position),
                rng.gaussian(noise.odometry_position),
                0.0,
            );
        let yaw = yaw_of(&true_delta.rotation) + rng.gaussian(noise.odometry_yaw);
        let odometry = Isometry3::new(
            Vector3::new(translation.x, translation.y, 0.0),
            Vector3::z() * yaw,
        );
        Self {
            camera_to_root,
            odometry: Some(odometry),
            camera_height,
        }
    }
}

impl BodyModel for SimBody {
    fn camera_to_root(&self) -> Pose {
        self.camera_to_root
    }

    fn odometry_delta(&self) -> Option<Pose> {
        self.odometry
    }

    fn camera_height(&self) -> f64 {
        self.camera_height
    }
}

/// Inertial orientation for one cycle.
#[derive(Debug, Clone)]
pub struct SimImu {
    orientation: Option<Orientation>,
}

impl SimImu {
    /// A negative `noise.imu_yaw` models a robot without usable inertial heading.
    pub fn new(truth: &Orientation, noise: &NoiseConfig, rng: &mut SimulationRng) -> Self {
        if noise.imu_yaw < 0.0 {
            return Self { orientation: None };
        }
        let (roll, pitch, yaw) = truth.euler_angles();
        Self {
            orientation: Some(UnitQuaternion::from_euler_angles(
                roll,
                pitch,
                yaw + rng.gaussian(noise.imu_yaw),
            )),
        }
    }
}

impl InertialSensor for SimImu {
    fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }
}
