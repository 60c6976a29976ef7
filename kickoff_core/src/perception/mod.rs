// kickoff_core/src/perception/mod.rs

//! Per-cycle sightings of known field features.
//!
//! Observations are created fresh every cycle from raw perception and dropped
//! at the end of it. They are never persisted between cycles.

mod depth;
mod observation;

pub use depth::intersect_ground;
pub use observation::{LineObservation, PointObservation};
