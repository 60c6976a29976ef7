// kickoff_sim/src/simulation/config/mod.rs

//! This module handles loading scenario configuration from disk or from a
//! string, and discovering every scenario under a directory.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Format, Toml},
    Figment,
};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{Result, SimError};

pub mod structs;

pub use structs::{
    BallConfig, NoiseConfig, PlanarPose, RobotConfig, ScenarioConfig, Simulation,
};

impl ScenarioConfig {
    /// Loads a scenario file. A missing file is an error rather than an
    /// all-defaults scenario.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SimError::MissingScenario(path.to_path_buf()));
        }
        info!("Loading scenario from: {:?}", path);
        let config: ScenarioConfig = Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a scenario from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ScenarioConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects scenarios the simulator cannot run.
    pub fn validate(&self) -> Result<()> {
        if !(self.simulation.dt > 0.0) {
            return Err(SimError::Invalid(format!(
                "simulation.dt must be positive, got {}",
                self.simulation.dt
            )));
        }
        if !(self.robot.camera_height > 0.0) {
            return Err(SimError::Invalid(format!(
                "robot.camera_height must be positive, got {}",
                self.robot.camera_height
            )));
        }
        for (name, p) in [
            ("noise.depth_dropout", self.noise.depth_dropout),
            ("noise.blackout_probability", self.noise.blackout_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::Invalid(format!(
                    "{name} must be a probability, got {p}"
                )));
            }
        }
        self.world_model.validate()?;
        Ok(())
    }
}

/// Expands a path into the scenario files it names: the file itself, or
/// every `.toml` file below a directory, sorted.
pub fn scenario_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(SimError::MissingScenario(path.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {:?}: {}", path, e);
                continue;
            }
        };
        if !entry.file_type().is_dir()
            && entry.path().extension().is_some_and(|ext| ext == "toml")
        {
            files.push(entry.into_path());
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(SimError::NoScenarios(path.to_path_buf()));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickoff_core::filtering::PositionFilterConfig;

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            [simulation]
            name = "short"
            seed = 3
            duration_seconds = 1.2
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.name, "short");
        assert_eq!(config.simulation.cycles(), 20);
        assert_eq!(config.field.length, 30.0);
        assert_eq!(config.world_model.localizer.particle_count, 200);
    }

    #[test]
    fn test_nested_filter_configuration() {
        let config = ScenarioConfig::from_toml_str(
            r#"
            [world_model.localizer]
            particle_count = 50
            output_filter = { type = "LinearWeighted", capacity = 4 }

            [world_model.localizer.resampling]
            type = "Variance"
            max_variance = 0.001

            [world_model.object_filters.ball]
            type = "ResetOnJump"
            threshold = 1.0
            inner = { type = "BouncingBall" }
            "#,
        )
        .unwrap();

        assert_eq!(config.world_model.localizer.particle_count, 50);
        assert_eq!(
            config.world_model.localizer.output_filter,
            PositionFilterConfig::LinearWeighted { capacity: 4 }
        );
        let ball = config.world_model.filter_for("ball");
        assert_eq!(ball.get_type_str(), "ResetOnJump");
        assert_eq!(ball.build().unwrap().name(), "ResetOnJump");
    }

    #[test]
    fn test_unknown_fields_and_bad_values_are_rejected() {
        assert!(ScenarioConfig::from_toml_str("[simulation]\nduration_seconds = 1.0\nspeed = 2\n").is_err());
        assert!(ScenarioConfig::from_toml_str("[noise]\ndepth_dropout = 1.5\n").is_err());
        assert!(ScenarioConfig::from_toml_str(
            "[world_model.default_object_filter]\ntype = \"MovingAverage\"\ncapacity = 0\n"
        )
        .is_err());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = ScenarioConfig::load(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(SimError::MissingScenario(_))));
    }
}
