// kickoff_core/src/localization/visibility.rs

//! Absence-of-evidence weighting: a hypothesis that should have seen a
//! feature which perception did not report is less likely.

use std::collections::HashSet;
use std::fmt::Debug;

use dyn_clone::DynClone;
use serde::Deserialize;

use crate::error::{EstimationError, Result};
use crate::map::FeatureMap;
use crate::types::Pose;

/// Scores a particle by which map features it expects to see.
pub trait VisibilityModel: DynClone + Debug + Send + Sync {
    /// Returns a factor in `(0, 1]` multiplied into the particle's weight.
    ///
    /// # Arguments
    /// * `particle_pose`: Root pose hypothesis in the field frame.
    /// * `camera_to_root`: Camera mount on the root body.
    /// * `seen`: Names of the point features observed this cycle.
    fn visibility_factor(
        &self,
        particle_pose: &Pose,
        camera_to_root: &Pose,
        map: &FeatureMap,
        seen: &HashSet<&str>,
    ) -> f64;
}

dyn_clone::clone_trait_object!(VisibilityModel);

/// Does not penalize missing observations.
#[derive(Debug, Clone, Default)]
pub struct IgnoreVisibility;

impl VisibilityModel for IgnoreVisibility {
    fn visibility_factor(&self, _: &Pose, _: &Pose, _: &FeatureMap, _: &HashSet<&str>) -> f64 {
        1.0
    }
}

/// Penalizes point features that lie inside the camera's horizontal field
/// of view and range from the hypothesized pose but were not observed.
#[derive(Debug, Clone)]
pub struct FieldOfViewVisibility {
    half_fov: f64,
    max_range: f64,
    miss_factor: f64,
}

impl FieldOfViewVisibility {
    pub fn new(horizontal_fov: f64, max_range: f64, miss_factor: f64) -> Result<Self> {
        if !(horizontal_fov > 0.0 && horizontal_fov <= std::f64::consts::TAU) {
            return Err(EstimationError::parameter(
                "horizontal_fov",
                format!("must be within (0, 2pi], got {horizontal_fov}"),
            ));
        }
        if !(max_range > 0.0) {
            return Err(EstimationError::parameter(
                "max_range",
                format!("must be positive, got {max_range}"),
            ));
        }
        if !(miss_factor > 0.0 && miss_factor <= 1.0) {
            return Err(EstimationError::parameter(
                "miss_factor",
                format!("must be within (0, 1], got {miss_factor}"),
            ));
        }
        Ok(Self {
            half_fov: horizontal_fov / 2.0,
            max_range,
            miss_factor,
        })
    }

    /// True if a field-frame point lies inside the view of `camera`.
    pub fn in_view(&self, camera: &Pose, point: &nalgebra::Vector3<f64>) -> bool {
        let local = camera.inverse_transform_point(&(*point).into()).coords;
        if local.x <= 0.0 {
            return false;
        }
        let range = (local.x * local.x + local.y * local.y).sqrt();
        range <= self.max_range && local.y.atan2(local.x).abs() <= self.half_fov
    }
}

impl VisibilityModel for FieldOfViewVisibility {
    fn visibility_factor(
        &self,
        particle_pose: &Pose,
        camera_to_root: &Pose,
        map: &FeatureMap,
        seen: &HashSet<&str>,
    ) -> f64 {
        let camera = particle_pose * camera_to_root;
        let missed = map
            .points()
            .filter(|f| !seen.contains(f.name()) && self.in_view(&camera, f.known_position()))
            .count();
        self.miss_factor.powi(missed as i32)
    }
}

/// Selects the visibility model at configuration time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "PascalCase")]
pub enum VisibilityConfig {
    Ignore,
    FieldOfView {
        /// Full horizontal opening angle, radians.
        horizontal_fov: f64,
        max_range: f64,
        /// Weight factor per expected but unobserved feature.
        miss_factor: f64,
    },
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        VisibilityConfig::Ignore
    }
}

impl VisibilityConfig {
    pub fn build(&self) -> Result<Box<dyn VisibilityModel>> {
        Ok(match self {
            VisibilityConfig::Ignore => Box::new(IgnoreVisibility),
            VisibilityConfig::FieldOfView {
                horizontal_fov,
                max_range,
                miss_factor,
            } => Box::new(FieldOfViewVisibility::new(
                *horizontal_fov,
                *max_range,
                *miss_factor,
            )?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::PointFeature;
    use crate::types::planar_pose;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;
    use std::f64::consts::FRAC_PI_2;

    fn single_flag_map() -> FeatureMap {
        let mut map = FeatureMap::new();
        map.insert_point(PointFeature::new("F1", "flag", Vector3::new(5.0, 0.0, 0.0)))
            .unwrap();
        map
    }

    #[test]
    fn test_unseen_feature_in_view_is_penalized() {
        let model = FieldOfViewVisibility::new(FRAC_PI_2, 10.0, 0.5).unwrap();
        let map = single_flag_map();
        let mount = Pose::identity();
        let nothing_seen = HashSet::new();

        let facing = model.visibility_factor(&planar_pose(0.0, 0.0, 0.0), &mount, &map, &nothing_seen);
        let away = model.visibility_factor(&planar_pose(0.0, 0.0, 3.0), &mount, &map, &nothing_seen);
        assert_abs_diff_eq!(facing, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(away, 1.0, epsilon = 1e-12);

        let seen: HashSet<&str> = ["F1"].into_iter().collect();
        let observed = model.visibility_factor(&planar_pose(0.0, 0.0, 0.0), &mount, &map, &seen);
        assert_abs_diff_eq!(observed, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_feature_is_not_expected() {
        let model = FieldOfViewVisibility::new(FRAC_PI_2, 4.0, 0.5).unwrap();
        let factor = model.visibility_factor(
            &planar_pose(0.0, 0.0, 0.0),
            &Pose::identity(),
            &single_flag_map(),
            &HashSet::new(),
        );
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn test_config_validates_parameters() {
        assert!(VisibilityConfig::Ignore.build().is_ok());
        let bad = VisibilityConfig::FieldOfView {
            horizontal_fov: 1.0,
            max_range: 10.0,
            miss_factor: 0.0,
        };
        assert!(bad.build().is_err());
    }
}
