// kickoff_sim/src/simulation/sensors/camera.rs

use nalgebra::{UnitQuaternion, Vector3};
use tracing::debug;

use kickoff_core::map::FeatureMap;
use kickoff_core::perception::{LineObservation, PointObservation};
use kickoff_core::types::{Pose, Position, Time};
use kickoff_core::world_model::{ObjectSighting, PerceptionFrame};

use crate::simulation::config::NoiseConfig;
use crate::simulation::core::prng::SimulationRng;

pub const BALL: &str = "ball";

/// Produces noisy camera-frame sightings of the map and the ball.
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    noise: NoiseConfig,
    blackout_remaining: usize,
}

impl SyntheticCamera {
    pub fn new(noise: NoiseConfig) -> Self {
        Self {
            noise,
            blackout_remaining: 0,
        }
    }

    pub fn in_blackout(&self) -> bool {
        self.blackout_remaining > 0
    }

    /// True if a field-frame point is inside the view of a camera at `camera`.
    fn local_if_visible(&self, camera: &Pose, point: &Position) -> Option<Position> {
        let local = camera.inverse_transform_point(&(*point).into()).coords;
        if local.x <= 0.0 {
            return None;
        }
        let range = (local.x * local.x + local.y * local.y).sqrt();
        let bearing = local.y.atan2(local.x);
        (range <= self.noise.max_range && bearing.abs() <= self.noise.field_of_view / 2.0)
            .then_some(local)
    }

    /// Perturbs bearing, elevation and range of a camera-frame position.
    fn corrupt(&self, local: &Position, rng: &mut SimulationRng) -> Position {
        let range = local.norm();
        let rotation = UnitQuaternion::from_euler_angles(
            0.0,
            rng.gaussian(self.noise.bearing),
            rng.gaussian(self.noise.bearing),
        );
        let scale = 1.0 + rng.gaussian(self.noise.range_fraction);
        rotation * (local / range) * (range * scale)
    }

    /// One cycle of perception from `camera` (camera pose in the field frame).
    pub fn observe(
        &mut self,
        time: Time,
        camera: &Pose,
        map: &FeatureMap,
        ball: &Position,
        rng: &mut SimulationRng,
    ) -> PerceptionFrame {
        let mut frame = PerceptionFrame::new(time);

        if self.blackout_remaining == 0 && rng.chance(self.noise.blackout_probability) {
            self.blackout_remaining = self.noise.blackout_cycles;
            debug!(time, cycles = self.blackout_remaining, "perception blackout");
        }
        if self.blackout_remaining > 0 {
            self.blackout_remaining -= 1;
            return frame;
        }

        for feature in map.points() {
            let Some(local) = self.local_if_visible(camera, feature.known_position()) else {
                continue;
            };
            let seen = self.corrupt(&local, rng);
            let observation = if rng.chance(self.noise.depth_dropout) {
                PointObservation::new(time, feature.kind(), seen.normalize(), false)
            } else {
                PointObservation::new(time, feature.kind(), seen, true)
            };
            frame.points.push(observation);
        }

        for feature in map.lines() {
            let (Some(a), Some(b)) = (
                self.local_if_visible(camera, feature.known_start()),
                self.local_if_visible(camera, feature.known_end()),
            ) else {
                continue;
            };
            // Perception reports end points in no particular order.
            let (a, b) = if rng.chance(0.5) { (b, a) } else { (a, b) };
            let (a, b) = (self.corrupt(&a, rng), self.corrupt(&b, rng));
            let observation = if rng.chance(self.noise.depth_dropout) {
                LineObservation::new(time, feature.kind(), a.normalize(), b.normalize(), false)
            } else {
                LineObservation::new(time, feature.kind(), a, b, true)
            };
            frame.lines.push(observation);
        }

        if let Some(local) = self.local_if_visible(camera, ball) {
            frame.objects.push(ObjectSighting {
                kind: BALL.to_string(),
                position: self.corrupt(&local, rng),
            });
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickoff_core::map::field::PENALTY_SPOT;
    use kickoff_core::map::FieldDimensions;
    use kickoff_core::types::planar_pose;

    fn noiseless() -> NoiseConfig {
        NoiseConfig {
            range_fraction: 0.0,
            bearing: 0.0,
            depth_dropout: 0.0,
            blackout_probability: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_noiseless_camera_sees_features_ahead_only() {
        let map = FieldDimensions::default().build_map().unwrap();
        let mut camera = SyntheticCamera::new(noiseless());
        let mut rng = SimulationRng::new(Some(4));
        let mut pose = planar_pose(5.0, 0.0, 0.0);
        pose.translation.vector.z = 0.5;

        let frame = camera.observe(0.0, &pose, &map, &Vector3::new(7.0, 0.0, 0.0), &mut rng);
        // Goal posts and flags of the right goal line, plus its penalty spot.
        assert_eq!(frame.points.len(), 5);
        for observation in &frame.points {
            assert!(observation.has_depth());
            let global = pose.transform_point(&(*observation.position()).into());
            let expected_x = if observation.kind() == PENALTY_SPOT { 12.5 } else { 15.0 };
            assert!((global.x - expected_x).abs() < 1e-9);
        }
        assert_eq!(frame.objects.len(), 1);
        assert!(!frame.lines.is_empty());
    }

    #[test]
    fn test_blackout_suppresses_whole_frames() {
        let map = FieldDimensions::default().build_map().unwrap();
        let mut camera = SyntheticCamera::new(NoiseConfig {
            blackout_probability: 1.0,
            blackout_cycles: 3,
            ..noiseless()
        });
        let mut rng = SimulationRng::new(Some(4));
        let pose = planar_pose(0.0, 0.0, 0.0);
        for _ in 0..3 {
            let frame = camera.observe(0.0, &pose, &map, &Vector3::zeros(), &mut rng);
            assert!(frame.points.is_empty() && frame.lines.is_empty() && frame.objects.is_empty());
        }
    }
}
