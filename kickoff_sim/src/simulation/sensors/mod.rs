// kickoff_sim/src/simulation/sensors/mod.rs

//! Synthetic sensors: noisy views of the ground truth in the formats the
//! estimation core consumes.

mod body;
mod camera;

pub use body::{camera_mount, SimBody, SimImu};
pub use camera::{SyntheticCamera, BALL};
