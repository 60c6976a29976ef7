// kickoff_core/src/filtering/mod.rs

//! Smoothing and extrapolation of noisy position streams (ball, obstacles,
//! the localizer's own output).

use dyn_clone::DynClone;
use std::fmt::Debug;

use crate::types::Position;

/// The contract for any algorithm that smooths a stream of observed positions.
///
/// Implementations own all of their history/state exclusively. A `None` sample
/// marks a cycle without observation: the filter returns `None` and leaves its
/// sample history untouched. Filters with a motion model advance their
/// prediction by one cycle instead, so a later sample is compared against
/// where the object should be by then.
pub trait PositionFilter: DynClone + Debug + Send + Sync {
    /// Consumes the newest observed position and returns the smoothed estimate.
    ///
    /// # Arguments
    /// * `new`: The newest observed position, `None` if nothing was seen this cycle.
    /// * `old`: The last observed position of the same object, if any. It may
    ///   be several cycles old.
    /// * `speed`: An optional velocity measurement (units per second). Callers
    ///   that know the time between `old` and `new` should pass it here.
    fn filter_position(
        &mut self,
        new: Option<&Position>,
        old: Option<&Position>,
        speed: Option<&Position>,
    ) -> Option<Position>;

    /// Drops all accumulated history. Fixed parameters are kept.
    fn reset(&mut self);

    /// The filter's own velocity estimate, for filters that carry one.
    fn velocity_estimate(&self) -> Option<Position> {
        None
    }

    /// A short identifier for logging.
    fn name(&self) -> &'static str;
}

// Make the trait object cloneable.
dyn_clone::clone_trait_object!(PositionFilter);

mod ball_kalman;
mod config;
mod history;
mod linear_weighted;
mod low_frequency;
mod max_acceleration;
mod moving_average;
mod passthrough;
mod reset_on_jump;
mod variable_horizon;

// --- Re-export the public structs for a clean API ---
pub use ball_kalman::{BallKalmanNoise, BallPhysics, BouncingBallFilter};
pub use config::PositionFilterConfig;
pub use history::{PositionHistory, DEFAULT_HISTORY_CAPACITY};
pub use linear_weighted::LinearWeightedFilter;
pub use low_frequency::LowFrequencyFilter;
pub use max_acceleration::MaxAccelerationFilter;
pub use moving_average::MovingAverageFilter;
pub use passthrough::PassthroughFilter;
pub use reset_on_jump::ResetOnJumpFilter;
pub use variable_horizon::VariableHorizonFilter;
