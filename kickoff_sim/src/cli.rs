// kickoff_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

use crate::RunOverrides;

/// Kickoff: runs soccer-robot state-estimation scenarios and reports the
/// localization and ball-tracking error against ground truth.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// A scenario TOML file, or a directory whose `.toml` files are all run.
    #[arg(short, long, default_value = "assets/scenarios")]
    pub scenario: PathBuf,

    /// Overrides the seed of every scenario.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Overrides the number of cycles of every scenario.
    #[arg(long)]
    pub cycles: Option<usize>,
}

impl Cli {
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            seed: self.seed,
            cycles: self.cycles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_parse_into_overrides() {
        let cli = Cli::parse_from(["kickoff", "--scenario", "a.toml", "--seed", "9"]);
        assert_eq!(cli.scenario, PathBuf::from("a.toml"));
        let overrides = cli.overrides();
        assert_eq!(overrides.seed, Some(9));
        assert_eq!(overrides.cycles, None);
    }
}
