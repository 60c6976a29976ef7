// kickoff_core/src/map/feature.rs

use crate::types::Position;
use nalgebra::Vector3;

/// Appended to a feature name when it is mirrored onto the opposite field half.
pub const MIRROR_SUFFIX: &str = "_mirrored";

/// Mirrors a global position through the field centre (x -> -x, y -> -y).
fn mirror(position: &Position) -> Position {
    Vector3::new(-position.x, -position.y, position.z)
}

/// A landmark with a single known position in the global frame
/// (goal post, corner flag, penalty spot).
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    name: String,
    kind: String,
    known_position: Position,
}

impl PointFeature {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, known_position: Position) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            known_position,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn known_position(&self) -> &Position {
        &self.known_position
    }

    /// Returns a new feature for the opposite field half. `self` is untouched.
    pub fn mirrored(&self) -> Self {
        Self {
            name: format!("{}{}", self.name, MIRROR_SUFFIX),
            kind: self.kind.clone(),
            known_position: mirror(&self.known_position),
        }
    }
}

/// A field marking with two known end points in the global frame.
/// The order of the end points is part of the feature's identity.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFeature {
    name: String,
    kind: String,
    known_start: Position,
    known_end: Position,
}

impl LineFeature {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        known_start: Position,
        known_end: Position,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            known_start,
            known_end,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn known_start(&self) -> &Position {
        &self.known_start
    }

    pub fn known_end(&self) -> &Position {
        &self.known_end
    }

    pub fn length(&self) -> f64 {
        (self.known_end - self.known_start).norm()
    }

    /// Returns a new feature for the opposite field half. `self` is untouched.
    pub fn mirrored(&self) -> Self {
        Self {
            name: format!("{}{}", self.name, MIRROR_SUFFIX),
            kind: self.kind.clone(),
            known_start: mirror(&self.known_start),
            known_end: mirror(&self.known_end),
        }
    }
}
