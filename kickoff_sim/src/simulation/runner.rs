// kickoff_sim/src/simulation/runner.rs

//! Drives a scenario cycle by cycle and scores the estimates against
//! ground truth.

use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use kickoff_core::localization::Localizer;
use kickoff_core::map::FeatureMap;
use kickoff_core::types::{normalize_angle, yaw_of, Pose, Time};
use kickoff_core::world_model::{WorldModel, WorldSnapshot};

use crate::error::Result;
use crate::simulation::config::ScenarioConfig;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::sensors::{camera_mount, SimBody, SimImu, SyntheticCamera, BALL};
use crate::simulation::world::{BallSim, RobotWalker};

/// Summary of one scenario run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub name: String,
    pub cycles: usize,
    /// Cycles in which the localizer accepted a correction.
    pub corrected_cycles: usize,
    /// Planar RMS error of the published position, meters.
    pub position_rmse: f64,
    pub max_position_error: f64,
    /// RMS heading error, radians.
    pub heading_rmse: f64,
    /// RMS error of the tracked ball position over cycles where it was seen.
    pub ball_rmse: Option<f64>,
    pub final_confidence: f64,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} cycles ({} corrected), position rmse {:.3} m (max {:.3} m), heading rmse {:.3} rad",
            self.name,
            self.cycles,
            self.corrected_cycles,
            self.position_rmse,
            self.max_position_error,
            self.heading_rmse
        )?;
        if let Some(ball) = self.ball_rmse {
            write!(f, ", ball rmse {ball:.3} m")?;
        }
        write!(f, ", confidence {:.3}", self.final_confidence)
    }
}

#[derive(Debug, Default)]
struct ErrorAccumulator {
    squared: f64,
    max: f64,
    count: usize,
}

impl ErrorAccumulator {
    fn add(&mut self, error: f64) {
        self.squared += error * error;
        self.max = self.max.max(error);
        self.count += 1;
    }

    fn rmse(&self) -> Option<f64> {
        (self.count > 0).then(|| (self.squared / self.count as f64).sqrt())
    }
}

/// A complete simulated world around one agent's world model.
pub struct ScenarioRunner {
    config: ScenarioConfig,
    rng: SimulationRng,
    world_model: WorldModel,
    robot: RobotWalker,
    ball: BallSim,
    camera: SyntheticCamera,
    camera_to_root: Pose,
    time: Time,
    cycle: usize,
    corrected_cycles: usize,
    position_error: ErrorAccumulator,
    heading_error: ErrorAccumulator,
    ball_error: ErrorAccumulator,
}

impl ScenarioRunner {
    pub fn new(config: ScenarioConfig) -> Result<Self> {
        config.validate()?;
        let map: FeatureMap = config.field.build_map()?;
        let mut world_model = WorldModel::new(config.world_model.clone(), map)?;

        let robot = RobotWalker::new(&config.robot);
        let start = robot.pose();
        if config.robot.known_start {
            world_model.reset(0.0, Some(&start));
        } else {
            world_model.reset(0.0, None);
        }

        let field_half_extent = (config.field.half_length() + 0.5, config.field.half_width() + 0.5);
        Ok(Self {
            rng: SimulationRng::new(config.simulation.seed),
            world_model,
            ball: BallSim::new(&config.ball, field_half_extent),
            camera: SyntheticCamera::new(config.noise.clone()),
            camera_to_root: camera_mount(&config.robot),
            robot,
            time: 0.0,
            cycle: 0,
            corrected_cycles: 0,
            position_error: ErrorAccumulator::default(),
            heading_error: ErrorAccumulator::default(),
            ball_error: ErrorAccumulator::default(),
            config,
        })
    }

    /// Convenience: load a scenario file and build a runner for it.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::new(ScenarioConfig::load(path)?)
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn world_model(&self) -> &WorldModel {
        &self.world_model
    }

    pub fn time(&self) -> Time {
        self.time
    }

    /// Advances the world by one cycle and runs the estimation on it.
    pub fn step(&mut self) -> WorldSnapshot {
        let dt = self.config.simulation.dt;
        self.time += dt;
        self.cycle += 1;

        // --- Ground truth ---
        let true_delta = self.robot.step(dt);
        self.ball.step(dt, &mut self.rng);
        let root = self.robot.pose();
        let camera = root * self.camera_to_root;
        let ball = *self.ball.position();

        // --- Sensors ---
        let frame = self.camera.observe(
            self.time,
            &camera,
            self.world_model.map(),
            &ball,
            &mut self.rng,
        );
        let body = SimBody::new(
            self.camera_to_root,
            camera.translation.vector.z,
            &true_delta,
            &self.config.noise,
            &mut self.rng,
        );
        let imu = SimImu::new(&root.rotation, &self.config.noise, &mut self.rng);

        // --- Estimation ---
        let snapshot = self.world_model.update(&frame, &body, &imu);
        self.score(&snapshot, &root);
        snapshot
    }

    fn score(&mut self, snapshot: &WorldSnapshot, root: &Pose) {
        let localization = &snapshot.localization;
        if localization.time == self.time {
            self.corrected_cycles += 1;
        }

        let planar_error = (localization.localized_position().xy() - root.translation.vector.xy()).norm();
        self.position_error.add(planar_error);
        let heading_error = normalize_angle(localization.heading() - yaw_of(&root.rotation)).abs();
        self.heading_error.add(heading_error);

        if let Some(ball) = snapshot.object(BALL).filter(|b| b.visible) {
            self.ball_error.add((ball.position - *self.ball.position()).norm());
        }

        debug!(
            cycle = self.cycle,
            planar_error,
            heading_error,
            confidence = localization.confidence,
            "cycle scored"
        );
    }

    /// Runs `cycles` cycles (the configured duration if `None`) and reports.
    pub fn run(mut self, cycles: Option<usize>) -> RunReport {
        let cycles = cycles.unwrap_or_else(|| self.config.simulation.cycles());
        info!(
            "Running scenario '{}' for {} cycles",
            self.config.simulation.name, cycles
        );
        for _ in 0..cycles {
            self.step();
        }

        let report = RunReport {
            name: self.config.simulation.name.clone(),
            cycles: self.cycle,
            corrected_cycles: self.corrected_cycles,
            position_rmse: self.position_error.rmse().unwrap_or(0.0),
            max_position_error: self.position_error.max,
            heading_rmse: self.heading_error.rmse().unwrap_or(0.0),
            ball_rmse: self.ball_error.rmse(),
            final_confidence: self.world_model.localizer().get_state().confidence,
        };
        info!("{}", report);
        report
    }
}
