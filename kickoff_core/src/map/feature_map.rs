// kickoff_core/src/map/feature_map.rs

use std::collections::BTreeMap;

use super::{LineFeature, PointFeature};
use crate::error::{EstimationError, Result};

/// Name-indexed registry of the point and line features of a field.
///
/// Every feature is reachable by exactly one name. A name is unique across
/// both the point and the line table. Iteration is ordered by name, so a
/// seeded run visits features in the same order every time.
#[derive(Debug, Clone, Default)]
pub struct FeatureMap {
    points: BTreeMap<String, PointFeature>,
    lines: BTreeMap<String, LineFeature>,
}

impl FeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a point feature. Fails if the name is already taken.
    pub fn insert_point(&mut self, feature: PointFeature) -> Result<()> {
        self.check_name_free(feature.name())?;
        self.points.insert(feature.name().to_string(), feature);
        Ok(())
    }

    /// Adds a line feature. Fails if the name is already taken.
    pub fn insert_line(&mut self, feature: LineFeature) -> Result<()> {
        self.check_name_free(feature.name())?;
        self.lines.insert(feature.name().to_string(), feature);
        Ok(())
    }

    fn check_name_free(&self, name: &str) -> Result<()> {
        if self.points.contains_key(name) || self.lines.contains_key(name) {
            return Err(EstimationError::parameter(
                "feature name",
                format!("'{name}' is already registered"),
            ));
        }
        Ok(())
    }

    pub fn point(&self, name: &str) -> Option<&PointFeature> {
        self.points.get(name)
    }

    pub fn line(&self, name: &str) -> Option<&LineFeature> {
        self.lines.get(name)
    }

    pub fn points(&self) -> impl Iterator<Item = &PointFeature> {
        self.points.values()
    }

    pub fn lines(&self) -> impl Iterator<Item = &LineFeature> {
        self.lines.values()
    }

    pub fn points_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a PointFeature> {
        self.points.values().filter(move |f| f.kind() == kind)
    }

    pub fn lines_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a LineFeature> {
        self.lines.values().filter(move |f| f.kind() == kind)
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.lines.clear();
    }

    /// Replaces the whole content of the map. On error the map is left unchanged.
    pub fn replace_with(
        &mut self,
        points: impl IntoIterator<Item = PointFeature>,
        lines: impl IntoIterator<Item = LineFeature>,
    ) -> Result<()> {
        let mut fresh = FeatureMap::new();
        for point in points {
            fresh.insert_point(point)?;
        }
        for line in lines {
            fresh.insert_line(line)?;
        }
        *self = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn post(name: &str, y: f64) -> PointFeature {
        PointFeature::new(name, "goal_post", Vector3::new(15.0, y, 0.0))
    }

    #[test]
    fn test_names_are_unique_across_tables() {
        let mut map = FeatureMap::new();
        map.insert_point(post("G1R", 1.0)).unwrap();
        assert!(map.insert_point(post("G1R", 2.0)).is_err());

        let line = LineFeature::new("G1R", "field_line", Vector3::zeros(), Vector3::x());
        assert!(map.insert_line(line).is_err());
        assert_eq!(map.point_count(), 1);
        assert_eq!(map.line_count(), 0);
    }

    #[test]
    fn test_filter_by_kind() {
        let mut map = FeatureMap::new();
        map.insert_point(post("G1R", 1.0)).unwrap();
        map.insert_point(post("G2R", -1.0)).unwrap();
        map.insert_point(PointFeature::new("F1R", "flag", Vector3::new(15.0, 10.0, 0.0)))
            .unwrap();

        assert_eq!(map.points_of_kind("goal_post").count(), 2);
        assert_eq!(map.points_of_kind("flag").count(), 1);
        assert_eq!(map.lines_of_kind("field_line").count(), 0);
    }

    #[test]
    fn test_replace_is_atomic() {
        let mut map = FeatureMap::new();
        map.insert_point(post("G1R", 1.0)).unwrap();

        // Duplicate names in the replacement leave the original content in place.
        let result = map.replace_with(vec![post("A", 0.0), post("A", 1.0)], Vec::new());
        assert!(result.is_err());
        assert!(map.point("G1R").is_some());

        map.replace_with(vec![post("A", 0.0)], Vec::new()).unwrap();
        assert!(map.point("G1R").is_none());
        assert!(map.point("A").is_some());

        map.clear();
        assert!(map.is_empty());
    }
}
