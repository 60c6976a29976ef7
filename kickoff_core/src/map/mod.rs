// kickoff_core/src/map/mod.rs

//! The static registry of known field features the localizer matches against.

mod feature;
mod feature_map;
pub mod field;

// --- Re-export the public structs for a clean API ---
pub use feature::{LineFeature, PointFeature, MIRROR_SUFFIX};
pub use feature_map::FeatureMap;
pub use field::FieldDimensions;
