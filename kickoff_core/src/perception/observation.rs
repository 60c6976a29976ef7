// kickoff_core/src/perception/observation.rs

use crate::map::{LineFeature, PointFeature};
use crate::types::{Pose, Position, Time};

/// A single sighting of a point feature.
///
/// `position` is expressed in the sensing frame of whoever holds the
/// observation (camera frame as perceived, root frame once the world model has
/// converted it). Without depth, `position` is only a direction.
#[derive(Debug, Clone, PartialEq)]
pub struct PointObservation {
    time: Time,
    kind: String,
    name: Option<String>,
    position: Position,
    has_depth: bool,
}

impl PointObservation {
    pub fn new(time: Time, kind: impl Into<String>, position: Position, has_depth: bool) -> Self {
        Self {
            time,
            kind: kind.into(),
            name: None,
            position,
            has_depth,
        }
    }

    /// Creates an observation that perception already labeled with a map name.
    pub fn named(
        time: Time,
        kind: impl Into<String>,
        name: impl Into<String>,
        position: Position,
        has_depth: bool,
    ) -> Self {
        let mut observation = Self::new(time, kind, position, has_depth);
        observation.assign(name);
        observation
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_assigned(&self) -> bool {
        self.name.is_some()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn has_depth(&self) -> bool {
        self.has_depth
    }

    /// Records which map feature this observation is a sighting of.
    pub fn assign(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Replaces the observed position once depth has been reconstructed.
    pub fn assign_depth_info(&mut self, position: Position) {
        self.position = position;
        self.has_depth = true;
    }

    /// Returns a copy of this observation re-expressed through `transform`.
    /// Depth-less observations are directions, so only the rotation applies.
    pub fn transformed(&self, transform: &Pose) -> Self {
        let position = if self.has_depth {
            transform.transform_point(&self.position.into()).coords
        } else {
            transform.rotation * self.position
        };
        Self {
            position,
            ..self.clone()
        }
    }

    /// The observed position mapped into the global frame by `pose`.
    pub fn global_position(&self, pose: &Pose) -> Position {
        pose.transform_point(&self.position.into()).coords
    }

    /// Distance between the observation, seen from `pose`, and the feature's known position.
    pub fn deviation(&self, pose: &Pose, feature: &PointFeature) -> f64 {
        (self.global_position(pose) - feature.known_position()).norm()
    }
}

/// A single sighting of a line feature.
///
/// The observed end points carry no natural order. Once the observation is
/// assigned to a map line, `swap_ends` records whether the observed start
/// corresponds to the known end of that line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineObservation {
    time: Time,
    kind: String,
    name: Option<String>,
    start: Position,
    end: Position,
    has_depth: bool,
    swap_ends: bool,
}

impl LineObservation {
    pub fn new(
        time: Time,
        kind: impl Into<String>,
        start: Position,
        end: Position,
        has_depth: bool,
    ) -> Self {
        Self {
            time,
            kind: kind.into(),
            name: None,
            start,
            end,
            has_depth,
            swap_ends: false,
        }
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_assigned(&self) -> bool {
        self.name.is_some()
    }

    pub fn start(&self) -> &Position {
        &self.start
    }

    pub fn end(&self) -> &Position {
        &self.end
    }

    pub fn has_depth(&self) -> bool {
        self.has_depth
    }

    pub fn swap_ends(&self) -> bool {
        self.swap_ends
    }

    /// Records which map line this observation is a sighting of, and whether
    /// the observed end points run opposite to the known ones.
    pub fn assign(&mut self, name: impl Into<String>, swap_ends: bool) {
        self.name = Some(name.into());
        self.swap_ends = swap_ends;
    }

    /// Replaces both observed end points once depth has been reconstructed.
    pub fn assign_depth_info(&mut self, start: Position, end: Position) {
        self.start = start;
        self.end = end;
        self.has_depth = true;
    }

    /// Returns a copy of this observation re-expressed through `transform`.
    pub fn transformed(&self, transform: &Pose) -> Self {
        let map = |p: &Position| {
            if self.has_depth {
                transform.transform_point(&(*p).into()).coords
            } else {
                transform.rotation * p
            }
        };
        Self {
            start: map(&self.start),
            end: map(&self.end),
            ..self.clone()
        }
    }

    /// The observed (start, end) mapped into the global frame by `pose`.
    pub fn global_endpoints(&self, pose: &Pose) -> (Position, Position) {
        (
            pose.transform_point(&self.start.into()).coords,
            pose.transform_point(&self.end.into()).coords,
        )
    }

    /// The known positions that correspond to the observed (start, end),
    /// honouring `swap_ends`.
    pub fn corresponding_known<'a>(&self, feature: &'a LineFeature) -> (&'a Position, &'a Position) {
        if self.swap_ends {
            (feature.known_end(), feature.known_start())
        } else {
            (feature.known_start(), feature.known_end())
        }
    }

    /// Mean end-point distance between the observation, seen from `pose`, and
    /// the known line, using the recorded end-point order.
    pub fn deviation(&self, pose: &Pose, feature: &LineFeature) -> f64 {
        let (start, end) = self.global_endpoints(pose);
        let (known_start, known_end) = self.corresponding_known(feature);
        0.5 * ((start - known_start).norm() + (end - known_end).norm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::planar_pose;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_point_global_position_uses_pose() {
        let observation = PointObservation::new(0.0, "flag", Vector3::new(1.0, 0.0, 0.0), true);
        let pose = planar_pose(2.0, 3.0, FRAC_PI_2);
        let global = observation.global_position(&pose);
        assert_abs_diff_eq!(global.x, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(global.y, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_depthless_transform_only_rotates() {
        let observation = PointObservation::new(0.0, "flag", Vector3::new(1.0, 0.0, 0.0), false);
        let moved = observation.transformed(&planar_pose(5.0, 5.0, FRAC_PI_2));
        assert_abs_diff_eq!(moved.position().x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(moved.position().y, 1.0, epsilon = 1e-9);
        assert!(!moved.has_depth());
    }

    #[test]
    fn test_assign_depth_info_replaces_position() {
        let mut observation = PointObservation::new(0.0, "flag", Vector3::new(0.0, 0.0, -1.0), false);
        observation.assign_depth_info(Vector3::new(2.0, 0.0, -0.5));
        assert!(observation.has_depth());
        assert_eq!(*observation.position(), Vector3::new(2.0, 0.0, -0.5));
        assert!(!observation.is_assigned());
    }

    #[test]
    fn test_swapped_line_maps_start_to_known_end() {
        let known = LineFeature::new(
            "goal_line",
            "field_line",
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        let mut observation = LineObservation::new(
            0.0,
            "field_line",
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            true,
        );
        observation.assign("goal_line", true);

        let (s, e) = observation.corresponding_known(&known);
        assert_eq!(*s, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(*e, Vector3::new(0.0, -1.0, 0.0));
        assert_abs_diff_eq!(
            observation.deviation(&Pose::identity(), &known),
            0.0,
            epsilon = 1e-12
        );
    }
}
