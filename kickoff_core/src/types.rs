// kickoff_core/src/types.rs

use nalgebra::{Isometry3, UnitQuaternion, Vector3};

// --- Core Type Aliases ---
/// Simulation time in seconds, as reported by the global-time perceptor.
pub type Time = f64;
/// A rigid pose (position + orientation) in some frame.
pub type Pose = Isometry3<f64>;
pub type Position = Vector3<f64>;
pub type Orientation = UnitQuaternion<f64>;

/// Heading (rotation about the vertical axis) of an orientation, in radians.
pub fn yaw_of(orientation: &Orientation) -> f64 {
    orientation.euler_angles().2
}

/// Splits an orientation into its tilt (roll and pitch) part, dropping the heading.
pub fn tilt_of(orientation: &Orientation) -> Orientation {
    let (roll, pitch, _) = orientation.euler_angles();
    UnitQuaternion::from_euler_angles(roll, pitch, 0.0)
}

/// Wraps an angle into `(-pi, pi]`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.sin().atan2(angle.cos());
    if wrapped <= -std::f64::consts::PI {
        wrapped + 2.0 * std::f64::consts::PI
    } else {
        wrapped
    }
}

/// Builds a planar pose from a ground position and a heading.
pub fn planar_pose(x: f64, y: f64, yaw: f64) -> Pose {
    Isometry3::new(Vector3::new(x, y, 0.0), Vector3::z() * yaw)
}

/// Returns true if every component of the vector is finite.
pub fn is_finite(v: &Position) -> bool {
    v.iter().all(|c| c.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_normalize_angle_wraps_into_range() {
        assert_abs_diff_eq!(normalize_angle(1.5 * PI), -PI / 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(normalize_angle(-PI / 2.0), -PI / 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(normalize_angle(2.0 * PI + 0.1), 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_tilt_drops_heading() {
        let q = UnitQuaternion::from_euler_angles(0.1, -0.2, 1.3);
        let (roll, pitch, yaw) = tilt_of(&q).euler_angles();
        assert_abs_diff_eq!(roll, 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(pitch, -0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(yaw, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(yaw_of(&q), 1.3, epsilon = 1e-9);
    }
}
