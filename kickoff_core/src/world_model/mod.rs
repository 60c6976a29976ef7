// kickoff_core/src/world_model/mod.rs

//! Per-cycle orchestration: converts raw camera sightings into the root
//! frame, drives the localizer and tracks moving objects.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::filtering::PositionFilterConfig;
use crate::localization::{Localizer, LocalizerConfig, ParticleLocalizer};
use crate::map::FeatureMap;
use crate::perception::{LineObservation, PointObservation};
use crate::types::{Orientation, Pose, Position, Time};

mod snapshot;
mod tracker;

pub use snapshot::{TrackedObject, WorldSnapshot};
use tracker::ObjectTracker;

// --- Collaborator contracts ---

/// The agent's kinematic body, queried once per update.
pub trait BodyModel {
    /// Pose of the camera on the root body (camera frame to root frame).
    fn camera_to_root(&self) -> Pose;
    /// Root-frame displacement since the previous update, `None` if unknown.
    fn odometry_delta(&self) -> Option<Pose>;
    /// Height of the camera above the ground.
    fn camera_height(&self) -> f64;
}

pub trait InertialSensor {
    /// Absolute orientation of the root body, `None` if unavailable.
    fn orientation(&self) -> Option<Orientation>;
}

/// A sighting of a moving object, in the camera frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSighting {
    pub kind: String,
    pub position: Position,
}

/// Everything perception delivered for one cycle, in the camera frame.
#[derive(Debug, Clone, Default)]
pub struct PerceptionFrame {
    pub time: Time,
    pub points: Vec<PointObservation>,
    pub lines: Vec<LineObservation>,
    pub objects: Vec<ObjectSighting>,
}

impl PerceptionFrame {
    pub fn new(time: Time) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }
}

// --- Configuration ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WorldModelConfig {
    pub localizer: LocalizerConfig,
    /// Filter per object kind, e.g. `[world_model.object_filters.ball]`.
    pub object_filters: HashMap<String, PositionFilterConfig>,
    /// Filter for kinds without an entry in `object_filters`.
    pub default_object_filter: PositionFilterConfig,
}

impl Default for WorldModelConfig {
    fn default() -> Self {
        Self {
            localizer: LocalizerConfig::default(),
            object_filters: HashMap::new(),
            default_object_filter: PositionFilterConfig::default(),
        }
    }
}

impl WorldModelConfig {
    pub fn filter_for(&self, kind: &str) -> &PositionFilterConfig {
        self.object_filters
            .get(kind)
            .unwrap_or(&self.default_object_filter)
    }

    /// Builds every configured filter once, so bad parameters surface here.
    pub fn validate(&self) -> Result<()> {
        self.localizer.validate()?;
        self.default_object_filter.build()?;
        for config in self.object_filters.values() {
            config.build()?;
        }
        Ok(())
    }
}

// --- Orchestrator ---

/// Owns the localizer and one tracker per moving-object kind of a single agent.
#[derive(Debug)]
pub struct WorldModel {
    config: WorldModelConfig,
    map: FeatureMap,
    localizer: Box<dyn Localizer>,
    trackers: HashMap<String, ObjectTracker>,
    snapshot: WorldSnapshot,
}

impl WorldModel {
    pub fn new(config: WorldModelConfig, map: FeatureMap) -> Result<Self> {
        config.validate()?;
        let localizer = Box::new(ParticleLocalizer::new(config.localizer.clone())?);
        Ok(Self::with_localizer(config, map, localizer))
    }

    /// Uses a caller-provided localizer instead of the configured one.
    pub fn with_localizer(
        config: WorldModelConfig,
        map: FeatureMap,
        localizer: Box<dyn Localizer>,
    ) -> Self {
        let snapshot = WorldSnapshot {
            localization: localizer.get_state().clone(),
            ..Default::default()
        };
        Self {
            config,
            map,
            localizer,
            trackers: HashMap::new(),
            snapshot,
        }
    }

    pub fn map(&self) -> &FeatureMap {
        &self.map
    }

    pub fn localizer(&self) -> &dyn Localizer {
        self.localizer.as_ref()
    }

    pub fn snapshot(&self) -> &WorldSnapshot {
        &self.snapshot
    }

    /// Places the agent (kick-off, referee beam) and forgets all tracks.
    pub fn reset(&mut self, time: Time, pose: Option<&Pose>) {
        self.localizer.reset(time, pose);
        for tracker in self.trackers.values_mut() {
            tracker.reset();
        }
        self.snapshot = WorldSnapshot {
            time,
            localization: self.localizer.get_state().clone(),
            objects: HashMap::new(),
        };
    }

    /// Runs one full estimation cycle and publishes a fresh snapshot.
    pub fn update(
        &mut self,
        frame: &PerceptionFrame,
        body: &dyn BodyModel,
        inertial: &dyn InertialSensor,
    ) -> WorldSnapshot {
        let time = frame.time;
        let camera_to_root = body.camera_to_root();
        let camera_height = body.camera_height();
        let orientation = inertial.orientation();
        let odometry = body.odometry_delta();

        // Camera frame -> root frame
        let points: Vec<PointObservation> = frame
            .points
            .iter()
            .map(|o| o.transformed(&camera_to_root))
            .collect();
        let lines: Vec<LineObservation> = frame
            .lines
            .iter()
            .map(|o| o.transformed(&camera_to_root))
            .collect();

        self.localizer.set_camera_mount(&camera_to_root);
        self.localizer
            .predict(time, odometry.as_ref(), orientation.as_ref(), camera_height);
        let corrected = self.localizer.correct(
            time,
            &self.map,
            &points,
            &lines,
            orientation.as_ref(),
            camera_height,
        );
        if !corrected {
            debug!(time, "localization not corrected this cycle");
        }
        let localization = self.localizer.get_state().clone();

        // Moving objects, in the field frame through the published pose
        let camera_to_global = localization.localized_pose * camera_to_root;
        let mut sightings: HashMap<&str, Position> = HashMap::new();
        // One sighting per kind and cycle; perception lists its best one first.
        for sighting in &frame.objects {
            match sightings.entry(sighting.kind.as_str()) {
                Entry::Vacant(slot) => {
                    slot.insert(
                        camera_to_global
                            .transform_point(&sighting.position.into())
                            .coords,
                    );
                }
                Entry::Occupied(_) => {
                    debug!(time, kind = sighting.kind.as_str(), "extra sighting of object kind dropped");
                }
            }
        }
        for kind in sightings.keys() {
            if !self.trackers.contains_key(*kind) {
                let filter = self.config.filter_for(kind).build();
                match filter {
                    Ok(filter) => {
                        self.trackers
                            .insert(kind.to_string(), ObjectTracker::new(kind, filter));
                    }
                    Err(e) => debug!(kind = *kind, error = %e, "no tracker for object kind"),
                }
            }
        }

        let mut objects = HashMap::new();
        for (kind, tracker) in self.trackers.iter_mut() {
            let observed = sightings.get(kind.as_str());
            if let Some(object) = tracker.update(time, observed) {
                objects.insert(kind.clone(), object);
            }
        }

        self.snapshot = WorldSnapshot {
            time,
            localization,
            objects,
        };
        self.snapshot.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::FieldDimensions;
    use crate::types::planar_pose;
    use nalgebra::Vector3;

    struct StandingBody;

    impl BodyModel for StandingBody {
        fn camera_to_root(&self) -> Pose {
            Pose::identity()
        }
        fn odometry_delta(&self) -> Option<Pose> {
            Some(Pose::identity())
        }
        fn camera_height(&self) -> f64 {
            0.0
        }
    }

    struct NoImu;

    impl InertialSensor for NoImu {
        fn orientation(&self) -> Option<Orientation> {
            None
        }
    }

    fn frame_seen_from(map: &FeatureMap, truth: &Pose, time: Time, ball: Position) -> PerceptionFrame {
        let mut frame = PerceptionFrame::new(time);
        for feature in map.points() {
            let local = truth.inverse_transform_point(&(*feature.known_position()).into());
            frame
                .points
                .push(PointObservation::new(time, feature.kind(), local.coords, true));
        }
        let local_ball = truth.inverse_transform_point(&ball.into());
        frame.objects.push(ObjectSighting {
            kind: "ball".to_string(),
            position: local_ball.coords,
        });
        frame
    }

    #[test]
    fn test_update_publishes_pose_and_ball_track() {
        let map = FieldDimensions::default().build_map().unwrap();
        let truth = planar_pose(-3.0, 4.0, -0.5);
        let mut config = WorldModelConfig::default();
        config
            .object_filters
            .insert("ball".to_string(), PositionFilterConfig::Passthrough);
        let mut world = WorldModel::new(config, map.clone()).unwrap();
        world.reset(0.0, Some(&truth));

        let ball = Vector3::new(-1.0, 4.5, 0.0);
        let mut snapshot = WorldSnapshot::default();
        for cycle in 1..=10 {
            let time = cycle as f64 * 0.06;
            let frame = frame_seen_from(&map, &truth, time, ball);
            snapshot = world.update(&frame, &StandingBody, &NoImu);
        }

        let pose_error =
            (snapshot.localization.localized_position() - truth.translation.vector).norm();
        assert!(pose_error < 0.2, "pose error {pose_error}");
        let tracked = snapshot.object("ball").unwrap();
        assert!((tracked.position - ball).norm() < 0.3);
        assert!(tracked.visible);
        assert_eq!(world.snapshot(), &snapshot);
    }

    #[test]
    fn test_first_sighting_of_a_kind_is_tracked() {
        let map = FieldDimensions::default().build_map().unwrap();
        let truth = planar_pose(0.0, 0.0, 0.0);
        let mut config = WorldModelConfig::default();
        config
            .object_filters
            .insert("ball".to_string(), PositionFilterConfig::Passthrough);
        let mut world = WorldModel::new(config, map.clone()).unwrap();
        world.reset(0.0, Some(&truth));

        let ball = Vector3::new(2.0, 1.0, 0.0);
        let mut frame = frame_seen_from(&map, &truth, 0.06, ball);
        frame.objects.push(ObjectSighting {
            kind: "ball".to_string(),
            position: Vector3::new(-6.0, 3.0, 0.0),
        });
        let snapshot = world.update(&frame, &StandingBody, &NoImu);

        assert_eq!(snapshot.objects.len(), 1);
        assert!((snapshot.object("ball").unwrap().position - ball).norm() < 0.3);
    }

    #[test]
    fn test_blind_cycles_keep_finite_snapshot() {
        let map = FieldDimensions::default().build_map().unwrap();
        let mut world = WorldModel::new(WorldModelConfig::default(), map).unwrap();
        world.reset(0.0, Some(&planar_pose(1.0, 2.0, 0.0)));

        for cycle in 1..=100 {
            let snapshot = world.update(&PerceptionFrame::new(cycle as f64 * 0.06), &StandingBody, &NoImu);
            assert!(snapshot.localization.is_finite());
            assert!(snapshot.objects.is_empty());
        }
    }

    #[test]
    fn test_invalid_object_filter_fails_at_construction() {
        let mut config = WorldModelConfig::default();
        config.object_filters.insert(
            "ball".to_string(),
            PositionFilterConfig::MovingAverage { capacity: 0 },
        );
        let map = FieldDimensions::default().build_map().unwrap();
        assert!(WorldModel::new(config, map).is_err());
    }
}
