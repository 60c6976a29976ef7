// kickoff_sim/src/lib.rs

//! Scenario runner for the `kickoff_core` estimation stack: a synthetic soccer
//! field with a walking robot and a bouncing ball, driven from TOML scenarios.

// This prelude is for convenience for other files WITHIN the kickoff_sim crate.
pub mod prelude;

pub mod cli;
pub mod error;
pub mod simulation;

use std::path::Path;

use tracing::{error, info};

use crate::error::Result;
use crate::simulation::config::{scenario_files, ScenarioConfig};
use crate::simulation::runner::{RunReport, ScenarioRunner};

/// Overrides applied on top of every loaded scenario.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub seed: Option<u64>,
    pub cycles: Option<usize>,
}

/// Runs a single scenario configuration.
pub fn run_config(mut config: ScenarioConfig, overrides: &RunOverrides) -> Result<RunReport> {
    if let Some(seed) = overrides.seed {
        config.simulation.seed = Some(seed);
    }
    let runner = ScenarioRunner::new(config)?;
    Ok(runner.run(overrides.cycles))
}

/// Runs the scenario file at `path`, or every scenario below it if it is a
/// directory. A failing scenario does not stop the others; the first error is
/// returned after all have run.
pub fn run_path(path: &Path, overrides: &RunOverrides) -> Result<Vec<RunReport>> {
    let files = scenario_files(path)?;
    info!("Found {} scenario(s) under {:?}", files.len(), path);

    let mut reports = Vec::with_capacity(files.len());
    let mut first_error = None;
    for file in &files {
        match ScenarioConfig::load(file).and_then(|config| run_config(config, overrides)) {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!("Scenario {:?} failed: {}", file, e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(reports),
    }
}
