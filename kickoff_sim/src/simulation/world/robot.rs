// kickoff_sim/src/simulation/world/robot.rs

use nalgebra::Vector2;

use kickoff_core::types::{normalize_angle, planar_pose, Pose};

use crate::simulation::config::RobotConfig;

/// Heading errors above this make the robot turn on the spot.
const WALK_HEADING_TOLERANCE: f64 = 0.6;
const WAYPOINT_RADIUS: f64 = 0.2;

/// Ground-truth root body walking a loop of waypoints.
#[derive(Debug, Clone)]
pub struct RobotWalker {
    x: f64,
    y: f64,
    yaw: f64,
    root_height: f64,
    waypoints: Vec<Vector2<f64>>,
    target: usize,
    speed: f64,
    turn_rate: f64,
}

impl RobotWalker {
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            x: config.start.x,
            y: config.start.y,
            yaw: config.start.yaw,
            root_height: config.camera_height - config.camera_offset[2],
            waypoints: config
                .waypoints
                .iter()
                .map(|[x, y]| Vector2::new(*x, *y))
                .collect(),
            target: 0,
            speed: config.speed,
            turn_rate: config.turn_rate,
        }
    }

    /// True root pose in the field frame.
    pub fn pose(&self) -> Pose {
        let mut pose = planar_pose(self.x, self.y, self.yaw);
        pose.translation.vector.z = self.root_height;
        pose
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    /// Advances by `dt` and returns the true root-frame displacement.
    pub fn step(&mut self, dt: f64) -> Pose {
        let before = self.pose();
        if let Some(target) = self.waypoints.get(self.target).copied() {
            let to_target = target - Vector2::new(self.x, self.y);
            if to_target.norm() < WAYPOINT_RADIUS {
                self.target = (self.target + 1) % self.waypoints.len();
            } else {
                let heading_error = normalize_angle(to_target.y.atan2(to_target.x) - self.yaw);
                let max_turn = self.turn_rate * dt;
                self.yaw = normalize_angle(self.yaw + heading_error.clamp(-max_turn, max_turn));

                if heading_error.abs() < WALK_HEADING_TOLERANCE {
                    let distance = (self.speed * dt).min(to_target.norm());
                    self.x += distance * self.yaw.cos();
                    self.y += distance * self.yaw.sin();
                }
            }
        }
        before.inverse() * self.pose()
    }
}
