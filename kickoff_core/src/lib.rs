// kickoff_core/src/lib.rs

// This file defines the public modules of the library.
pub mod error;
pub mod filtering;
pub mod frames;
pub mod localization;
pub mod map;
pub mod perception;
pub mod prelude;
pub mod types;
pub mod world_model;
