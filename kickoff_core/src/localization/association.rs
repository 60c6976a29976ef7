// kickoff_core/src/localization/association.rs

//! Matches observations to map features using a single pose hypothesis.
//!
//! Association never mutates its input. It returns a fresh list holding only
//! the observations it could assign, each carrying its map name (and, for
//! lines, the end-point order).

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::map::FeatureMap;
use crate::perception::{LineObservation, PointObservation};
use crate::types::{is_finite, Pose};

/// Gating parameters for data association.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AssociationConfig {
    /// Maximum match distance for kinds without an entry in `tolerances`.
    pub default_tolerance: f64,
    /// Per-kind maximum match distance, in meters.
    pub tolerances: HashMap<String, f64>,
    /// If the runner-up candidate is within this distance of the best one,
    /// the observation is ambiguous and dropped.
    pub ambiguity_margin: f64,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            default_tolerance: 1.5,
            tolerances: HashMap::new(),
            ambiguity_margin: 0.25,
        }
    }
}

impl AssociationConfig {
    pub fn tolerance_for(&self, kind: &str) -> f64 {
        self.tolerances
            .get(kind)
            .copied()
            .unwrap_or(self.default_tolerance)
    }
}

/// Best and runner-up candidate of a nearest-neighbour search.
#[derive(Debug)]
struct Candidates<'a, T> {
    best: Option<(&'a str, f64, T)>,
    second_error: f64,
}

impl<'a, T> Candidates<'a, T> {
    fn new() -> Self {
        Self {
            best: None,
            second_error: f64::INFINITY,
        }
    }

    /// Non-finite errors never become a candidate.
    fn offer(&mut self, name: &'a str, error: f64, extra: T) {
        if !error.is_finite() {
            return;
        }
        match self.best.as_ref().map(|(_, best_error, _)| *best_error) {
            Some(best_error) if error >= best_error => {
                self.second_error = self.second_error.min(error);
            }
            Some(best_error) => {
                self.second_error = best_error;
                self.best = Some((name, error, extra));
            }
            None => self.best = Some((name, error, extra)),
        }
    }

    /// The winner, if it is within `tolerance` and clearly ahead of the runner-up.
    fn accept(self, tolerance: f64, margin: f64) -> Result<(&'a str, T), &'static str> {
        let Some((name, error, extra)) = self.best else {
            return Err("no feature of this kind in map");
        };
        if !(error <= tolerance) {
            return Err("nearest feature outside tolerance");
        }
        if !(self.second_error - error >= margin) {
            return Err("ambiguous match");
        }
        Ok((name, extra))
    }
}

/// Assigns each point observation to the nearest map point of the same kind.
///
/// Observations that perception already labeled are kept if the map knows
/// that name with a matching kind. Observations with a non-finite position
/// are dropped on their own without affecting the rest of the cycle.
pub fn associate_points(
    observations: &[PointObservation],
    map: &FeatureMap,
    pose: &Pose,
    config: &AssociationConfig,
) -> Vec<PointObservation> {
    let mut assigned = Vec::with_capacity(observations.len());
    for observation in observations {
        if !is_finite(observation.position()) {
            debug!(kind = observation.kind(), "non-finite point observation dropped");
            continue;
        }
        if let Some(name) = observation.name() {
            match map.point(name) {
                Some(feature) if feature.kind() == observation.kind() => {
                    assigned.push(observation.clone());
                }
                _ => debug!(name, "labeled point observation not in map, dropped"),
            }
            continue;
        }

        let global = observation.global_position(pose);
        let mut candidates = Candidates::new();
        for feature in map.points_of_kind(observation.kind()) {
            candidates.offer(feature.name(), (global - feature.known_position()).norm(), ());
        }

        let tolerance = config.tolerance_for(observation.kind());
        match candidates.accept(tolerance, config.ambiguity_margin) {
            Ok((name, ())) => {
                let mut matched = observation.clone();
                matched.assign(name);
                assigned.push(matched);
            }
            Err(reason) => debug!(kind = observation.kind(), reason, "point observation dropped"),
        }
    }
    assigned
}

/// Assigns each line observation to the best-fitting map line of the same
/// kind, choosing the end-point order with the lower error.
pub fn associate_lines(
    observations: &[LineObservation],
    map: &FeatureMap,
    pose: &Pose,
    config: &AssociationConfig,
) -> Vec<LineObservation> {
    let mut assigned = Vec::with_capacity(observations.len());
    for observation in observations {
        if !(is_finite(observation.start()) && is_finite(observation.end())) {
            debug!(kind = observation.kind(), "non-finite line observation dropped");
            continue;
        }
        let (start, end) = observation.global_endpoints(pose);

        if let Some(name) = observation.name() {
            match map.line(name) {
                Some(feature) if feature.kind() == observation.kind() => {
                    assigned.push(observation.clone());
                }
                _ => debug!(name, "labeled line observation not in map, dropped"),
            }
            continue;
        }

        let mut candidates = Candidates::new();
        for feature in map.lines_of_kind(observation.kind()) {
            let (a, b) = (feature.known_start(), feature.known_end());
            let straight = 0.5 * ((start - a).norm() + (end - b).norm());
            let swapped = 0.5 * ((start - b).norm() + (end - a).norm());
            if swapped < straight {
                candidates.offer(feature.name(), swapped, true);
            } else {
                candidates.offer(feature.name(), straight, false);
            }
        }

        let tolerance = config.tolerance_for(observation.kind());
        match candidates.accept(tolerance, config.ambiguity_margin) {
            Ok((name, swap_ends)) => {
                let mut matched = observation.clone();
                matched.assign(name, swap_ends);
                assigned.push(matched);
            }
            Err(reason) => debug!(kind = observation.kind(), reason, "line observation dropped"),
        }
    }
    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{FieldDimensions, LineFeature, PointFeature};
    use crate::types::planar_pose;
    use nalgebra::Vector3;

    fn two_post_map() -> FeatureMap {
        let mut map = FeatureMap::new();
        map.insert_point(PointFeature::new("post_a", "goal_post", Vector3::new(5.0, 1.0, 0.0)))
            .unwrap();
        map.insert_point(PointFeature::new("post_b", "goal_post", Vector3::new(5.0, -1.0, 0.0)))
            .unwrap();
        map.insert_line(LineFeature::new(
            "goal_line",
            "field_line",
            Vector3::new(5.0, -3.0, 0.0),
            Vector3::new(5.0, 3.0, 0.0),
        ))
        .unwrap();
        map
    }

    #[test]
    fn test_point_matches_nearest_feature_of_same_kind() {
        let map = two_post_map();
        let observations = vec![
            PointObservation::new(0.0, "goal_post", Vector3::new(4.9, 1.1, 0.0), true),
            PointObservation::new(0.0, "flag", Vector3::new(5.0, 1.0, 0.0), true),
        ];
        let assigned =
            associate_points(&observations, &map, &Pose::identity(), &AssociationConfig::default());

        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].name(), Some("post_a"));
        // Input untouched.
        assert!(!observations[0].is_assigned());
    }

    #[test]
    fn test_far_and_ambiguous_points_are_dropped() {
        let map = two_post_map();
        let observations = vec![
            PointObservation::new(0.0, "goal_post", Vector3::new(0.0, 0.0, 0.0), true),
            PointObservation::new(0.0, "goal_post", Vector3::new(5.0, 0.0, 0.0), true),
        ];
        let assigned =
            associate_points(&observations, &map, &Pose::identity(), &AssociationConfig::default());
        assert!(assigned.is_empty());
    }

    #[test]
    fn test_line_with_reversed_endpoints_is_swapped() {
        let map = two_post_map();
        // Robot at (3, 0) facing +X sees the goal line 2 m ahead, ends reversed.
        let pose = planar_pose(3.0, 0.0, 0.0);
        let observation = LineObservation::new(
            0.0,
            "field_line",
            Vector3::new(2.0, 3.0, 0.0),
            Vector3::new(2.0, -3.0, 0.0),
            true,
        );
        let assigned =
            associate_lines(&[observation], &map, &pose, &AssociationConfig::default());

        assert_eq!(assigned.len(), 1);
        let matched = &assigned[0];
        assert_eq!(matched.name(), Some("goal_line"));
        assert!(matched.swap_ends());

        let known = map.line("goal_line").unwrap();
        let (for_start, _) = matched.corresponding_known(known);
        assert_eq!(*for_start, *known.known_end());
        assert!(matched.deviation(&pose, known) < 1e-9);
    }

    #[test]
    fn test_labeled_observations_are_validated_against_map() {
        let map = FieldDimensions::default().build_map().unwrap();
        let observations = vec![
            PointObservation::named(0.0, "goal_post", "G1R", Vector3::new(1.0, 0.0, 0.0), true),
            PointObservation::named(0.0, "goal_post", "G9X", Vector3::new(1.0, 0.0, 0.0), true),
            PointObservation::named(0.0, "flag", "G2R", Vector3::new(1.0, 0.0, 0.0), true),
        ];
        let assigned =
            associate_points(&observations, &map, &Pose::identity(), &AssociationConfig::default());
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].name(), Some("G1R"));
    }

    #[test]
    fn test_non_finite_observations_are_dropped_individually() {
        let map = two_post_map();
        let points = vec![
            PointObservation::new(0.0, "goal_post", Vector3::new(4.9, 1.1, 0.0), true),
            PointObservation::new(0.0, "goal_post", Vector3::new(f64::NAN, 1.0, 0.0), true),
            PointObservation::named(0.0, "goal_post", "post_b", Vector3::new(5.0, f64::INFINITY, 0.0), true),
        ];
        let assigned =
            associate_points(&points, &map, &Pose::identity(), &AssociationConfig::default());
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].name(), Some("post_a"));

        let lines = vec![LineObservation::new(
            0.0,
            "field_line",
            Vector3::new(5.0, -3.0, 0.0),
            Vector3::new(5.0, f64::NAN, 0.0),
            true,
        )];
        assert!(associate_lines(&lines, &map, &Pose::identity(), &AssociationConfig::default())
            .is_empty());
    }

    #[test]
    fn test_nan_error_never_wins_or_passes_the_gate() {
        let mut candidates = Candidates::new();
        candidates.offer("post_a", f64::NAN, ());
        assert!(candidates.accept(1.5, 0.25).is_err());

        let mut candidates = Candidates::new();
        candidates.offer("post_a", 0.1, ());
        candidates.offer("post_b", f64::NAN, ());
        assert_eq!(candidates.accept(1.5, 0.25).map(|(name, _)| name), Ok("post_a"));
    }

    #[test]
    fn test_tolerance_can_be_set_per_kind() {
        let mut config = AssociationConfig::default();
        config.tolerances.insert("goal_post".to_string(), 0.05);
        assert_eq!(config.tolerance_for("goal_post"), 0.05);
        assert_eq!(config.tolerance_for("flag"), 1.5);

        let map = two_post_map();
        let observations = vec![PointObservation::new(
            0.0,
            "goal_post",
            Vector3::new(4.9, 1.1, 0.0),
            true,
        )];
        assert!(associate_points(&observations, &map, &Pose::identity(), &config).is_empty());
    }
}
