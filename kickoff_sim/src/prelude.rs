// kickoff_sim/src/prelude.rs

// --- Configuration ---
pub use crate::simulation::config::{
    BallConfig, NoiseConfig, PlanarPose, RobotConfig, ScenarioConfig, Simulation,
};

// --- Runtime ---
pub use crate::error::{Result, SimError};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::runner::{RunReport, ScenarioRunner};
pub use crate::{run_config, run_path, RunOverrides};
