// kickoff_core/src/perception/depth.rs

use crate::types::{Orientation, Position};

/// Rays flatter than this (vertical component of the unit direction) never
/// reach the ground within a useful distance.
const MIN_DOWNWARD_COMPONENT: f64 = 1e-3;

/// Reconstructs the missing depth of a sighting by intersecting its viewing
/// ray with the ground plane.
///
/// * `direction`: ray direction in root-body axes (any length).
/// * `origin`: ray origin (the camera) in the root frame.
/// * `tilt`: roll/pitch of the root body relative to the level ground frame.
/// * `camera_height`: height of the ray origin above the ground.
///
/// Returns the intersection in the root frame, or `None` if the ray points at
/// or above the horizon.
pub fn intersect_ground(
    direction: &Position,
    origin: &Position,
    tilt: &Orientation,
    camera_height: f64,
) -> Option<Position> {
    let norm = direction.norm();
    if norm <= f64::EPSILON || camera_height <= 0.0 {
        return None;
    }
    let unit = direction / norm;

    // Express the ray in the level frame, where the ground is z = -camera_height.
    let level = tilt * unit;
    if level.z > -MIN_DOWNWARD_COMPONENT {
        return None;
    }
    let distance = camera_height / -level.z;
    Some(origin + unit * distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn test_level_ray_hits_ground_at_expected_range() {
        // 45 degrees down from 0.5 m height lands 0.5 m ahead.
        let hit = intersect_ground(
            &Vector3::new(1.0, 0.0, -1.0),
            &Vector3::zeros(),
            &UnitQuaternion::identity(),
            0.5,
        )
        .unwrap();
        assert_abs_diff_eq!(hit.x, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(hit.z, -0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_ray_above_horizon_has_no_depth() {
        let hit = intersect_ground(
            &Vector3::new(1.0, 0.0, 0.1),
            &Vector3::zeros(),
            &UnitQuaternion::identity(),
            0.5,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_tilted_body_changes_intersection() {
        // Body pitched forward by 45 degrees: a ray straight ahead in body axes looks down.
        let tilt = UnitQuaternion::from_euler_angles(0.0, std::f64::consts::FRAC_PI_4, 0.0);
        let hit = intersect_ground(&Vector3::x(), &Vector3::zeros(), &tilt, 1.0).unwrap();
        assert_abs_diff_eq!(hit.norm(), 2f64.sqrt(), epsilon = 1e-9);
    }
}
