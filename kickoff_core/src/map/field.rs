// kickoff_core/src/map/field.rs

//! Builds the feature map of a standard soccer field.
//!
//! Features are defined once for the right (opponent) half and mirrored
//! through the centre spot for the left half. The half-way line is shared.

use nalgebra::Vector3;
use serde::Deserialize;

use super::{FeatureMap, LineFeature, PointFeature};
use crate::error::Result;

pub const GOAL_POST: &str = "goal_post";
pub const CORNER_FLAG: &str = "flag";
pub const PENALTY_SPOT: &str = "penalty_spot";
pub const FIELD_LINE: &str = "field_line";

/// Field geometry, in meters.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FieldDimensions {
    pub length: f64,
    pub width: f64,
    pub goal_width: f64,
    pub penalty_area_length: f64,
    pub penalty_area_width: f64,
    /// Distance of the penalty spot from the goal line.
    pub penalty_spot_distance: f64,
}

impl Default for FieldDimensions {
    fn default() -> Self {
        Self {
            length: 30.0,
            width: 20.0,
            goal_width: 2.1,
            penalty_area_length: 1.8,
            penalty_area_width: 6.0,
            penalty_spot_distance: 2.5,
        }
    }
}

impl FieldDimensions {
    pub fn half_length(&self) -> f64 {
        self.length / 2.0
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Builds the full feature map (both halves) for these dimensions.
    pub fn build_map(&self) -> Result<FeatureMap> {
        let hl = self.half_length();
        let hw = self.half_width();
        let hg = self.goal_width / 2.0;
        let pa_x = hl - self.penalty_area_length;
        let hpw = self.penalty_area_width / 2.0;

        let right_points = vec![
            PointFeature::new("G1R", GOAL_POST, Vector3::new(hl, hg, 0.0)),
            PointFeature::new("G2R", GOAL_POST, Vector3::new(hl, -hg, 0.0)),
            PointFeature::new("F1R", CORNER_FLAG, Vector3::new(hl, hw, 0.0)),
            PointFeature::new("F2R", CORNER_FLAG, Vector3::new(hl, -hw, 0.0)),
            PointFeature::new(
                "P1R",
                PENALTY_SPOT,
                Vector3::new(hl - self.penalty_spot_distance, 0.0, 0.0),
            ),
        ];

        let right_lines = vec![
            line("goal_line_R", (hl, -hw), (hl, hw)),
            line("side_line_top_R", (0.0, hw), (hl, hw)),
            line("side_line_bottom_R", (0.0, -hw), (hl, -hw)),
            line("penalty_front_R", (pa_x, -hpw), (pa_x, hpw)),
            line("penalty_side_top_R", (pa_x, hpw), (hl, hpw)),
            line("penalty_side_bottom_R", (pa_x, -hpw), (hl, -hpw)),
        ];

        let points: Vec<PointFeature> = right_points
            .iter()
            .map(PointFeature::mirrored)
            .chain(right_points.iter().cloned())
            .collect();

        let lines: Vec<LineFeature> = right_lines
            .iter()
            .map(LineFeature::mirrored)
            .chain(right_lines.iter().cloned())
            .chain(std::iter::once(line("half_way_line", (0.0, -hw), (0.0, hw))))
            .collect();

        let mut map = FeatureMap::new();
        map.replace_with(points, lines)?;
        Ok(map)
    }
}

fn line(name: &str, start: (f64, f64), end: (f64, f64)) -> LineFeature {
    LineFeature::new(
        name,
        FIELD_LINE,
        Vector3::new(start.0, start.1, 0.0),
        Vector3::new(end.0, end.1, 0.0),
    )
}
