// kickoff_sim/src/simulation/config/structs.rs

use nalgebra::Vector3;
use serde::Deserialize;

use kickoff_core::filtering::BallPhysics;
use kickoff_core::map::FieldDimensions;
use kickoff_core::types::{planar_pose, Pose};
use kickoff_core::world_model::WorldModelConfig;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file. Every section is
/// optional and falls back to its default.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: Simulation,
    #[serde(default)]
    pub field: FieldDimensions,
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub ball: BallConfig,
    #[serde(default)]
    pub noise: NoiseConfig,
    #[serde(default)]
    pub world_model: WorldModelConfig,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Human readable name used in logs and reports.
    #[serde(default = "default_name")]
    pub name: String,
    /// Seed for the simulation's pseudo-random number generator.
    pub seed: Option<u64>,
    #[serde(default = "default_duration")]
    pub duration_seconds: f64,
    /// Length of one perception/estimation cycle in seconds.
    #[serde(default = "default_dt")]
    pub dt: f64,
}

fn default_name() -> String {
    "unnamed".to_string()
}

fn default_duration() -> f64 {
    30.0
}

fn default_dt() -> f64 {
    0.06
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed: None,
            duration_seconds: default_duration(),
            dt: default_dt(),
        }
    }
}

impl Simulation {
    pub fn cycles(&self) -> usize {
        if self.dt > 0.0 {
            (self.duration_seconds / self.dt).round() as usize
        } else {
            0
        }
    }
}

/// A planar pose written as `{ x = .., y = .., yaw = .. }` (yaw in radians).
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PlanarPose {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub yaw: f64,
}

impl PlanarPose {
    pub fn to_isometry(&self) -> Pose {
        planar_pose(self.x, self.y, self.yaw)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RobotConfig {
    pub start: PlanarPose,
    /// Ground points visited in a loop.
    pub waypoints: Vec<[f64; 2]>,
    /// Walking speed, m/s.
    pub speed: f64,
    /// Maximum turning rate, rad/s.
    pub turn_rate: f64,
    /// Camera height above the ground, meters.
    pub camera_height: f64,
    /// Camera position on the root body.
    pub camera_offset: [f64; 3],
    /// Downward camera pitch, radians.
    pub camera_pitch: f64,
    /// Whether the localizer is told the start pose.
    pub known_start: bool,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            start: PlanarPose {
                x: -5.0,
                y: 0.0,
                yaw: 0.0,
            },
            waypoints: vec![[5.0, 0.0], [5.0, 5.0], [-5.0, 5.0], [-5.0, 0.0]],
            speed: 0.6,
            turn_rate: 1.0,
            camera_height: 0.55,
            camera_offset: [0.05, 0.0, 0.1],
            camera_pitch: 0.15,
            known_start: true,
        }
    }
}

impl RobotConfig {
    pub fn camera_offset(&self) -> Vector3<f64> {
        Vector3::from(self.camera_offset)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BallConfig {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    /// Ground-truth physics. Independent of the tracking filter's model.
    pub physics: BallPhysics,
    /// Seconds between random kicks; 0 disables kicking.
    pub kick_interval_seconds: f64,
    pub kick_speed: f64,
    /// Below this speed the ball is considered resting.
    pub rest_speed: f64,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            velocity: [0.0, 0.0, 0.0],
            physics: BallPhysics::default(),
            kick_interval_seconds: 6.0,
            kick_speed: 4.0,
            rest_speed: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NoiseConfig {
    /// Std of the per-cycle odometry translation error, meters.
    pub odometry_position: f64,
    /// Std of the per-cycle odometry heading error, radians.
    pub odometry_yaw: f64,
    /// Std of the inertial heading error, radians. Negative disables the IMU.
    pub imu_yaw: f64,
    /// Range error as a fraction of the true distance.
    pub range_fraction: f64,
    /// Std of the bearing error of every sighting, radians.
    pub bearing: f64,
    /// Probability that a sighting arrives without depth.
    pub depth_dropout: f64,
    /// Probability that a blackout starts in any cycle.
    pub blackout_probability: f64,
    /// Length of a blackout in cycles.
    pub blackout_cycles: usize,
    /// Full horizontal field of view, radians.
    pub field_of_view: f64,
    pub max_range: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            odometry_position: 0.01,
            odometry_yaw: 0.005,
            imu_yaw: 0.01,
            range_fraction: 0.02,
            bearing: 0.01,
            depth_dropout: 0.2,
            blackout_probability: 0.01,
            blackout_cycles: 15,
            field_of_view: 2.0,
            max_range: 18.0,
        }
    }
}
