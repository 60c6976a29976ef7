// kickoff_core/src/localization/engine.rs

use std::collections::{HashMap, HashSet};

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, warn};

use super::association::{associate_lines, associate_points};
use super::config::{LocalizerConfig, PoseSpread};
use super::importance::{normalize_importance, observation_likelihood};
use super::sensor::{
    LocalizationSensor, SensorKind, CAMERA_SENSOR, INERTIAL_SENSOR, ODOMETRY_SENSOR,
};
use super::{LocalizationInfo, Localizer, VisibilityModel, WeightedParticle};
use crate::error::Result;
use crate::filtering::PositionFilter;
use crate::map::FeatureMap;
use crate::perception::{intersect_ground, LineObservation, PointObservation};
use crate::types::{tilt_of, yaw_of, Orientation, Pose, Position, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalizerStatus {
    /// No pose has been supplied yet. Predict and correct are no-ops.
    Uninitialized,
    Tracking,
}

/// Monte Carlo localization of the root body against a feature map.
#[derive(Debug, Clone)]
pub struct ParticleLocalizer {
    config: LocalizerConfig,
    status: LocalizerStatus,
    particles: Vec<WeightedParticle>,
    camera_to_root: Pose,
    visibility: Box<dyn VisibilityModel>,
    output_filter: Box<dyn PositionFilter>,
    info: LocalizationInfo,
    sensors: HashMap<String, LocalizationSensor>,
    rng: ChaCha8Rng,
    last_predict: Option<Time>,
}

impl ParticleLocalizer {
    pub fn new(config: LocalizerConfig) -> Result<Self> {
        config.validate()?;
        let visibility = config.visibility.build()?;
        let output_filter = config.output_filter.build()?;

        let sensors = HashMap::from([
            (
                ODOMETRY_SENSOR.to_string(),
                LocalizationSensor::new(SensorKind::Odometry, config.odometry_noise.position),
            ),
            (
                INERTIAL_SENSOR.to_string(),
                LocalizationSensor::new(SensorKind::Inertial, config.rotation_noise),
            ),
            (
                CAMERA_SENSOR.to_string(),
                LocalizationSensor::new(SensorKind::Camera, config.observation_sigma),
            ),
        ]);

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            status: LocalizerStatus::Uninitialized,
            particles: Vec::new(),
            camera_to_root: Pose::identity(),
            visibility,
            output_filter,
            info: LocalizationInfo::default(),
            sensors,
            last_predict: None,
        })
    }

    pub fn status(&self) -> LocalizerStatus {
        self.status
    }

    pub fn particles(&self) -> &[WeightedParticle] {
        &self.particles
    }

    pub fn config(&self) -> &LocalizerConfig {
        &self.config
    }

    pub fn camera_to_root(&self) -> &Pose {
        &self.camera_to_root
    }

    /// Normalizes the current particle weights by `weight_sum`.
    /// See [`normalize_importance`].
    pub fn normalize_importance(&mut self, weight_sum: f64) -> bool {
        normalize_importance(&mut self.particles, weight_sum)
    }

    /// Replaces the particle at `index` with a perturbed copy of a randomly
    /// chosen particle. The slot keeps its probability.
    pub fn add_random_particle(&mut self, index: usize) {
        if index >= self.particles.len() {
            return;
        }
        let source = self.rng.gen_range(0..self.particles.len());
        let spread = self.config.random_particle_spread;
        let source_pose = *self.particles[source].pose();
        let pose = self.perturbed(&source_pose, spread);

        let slot = &mut self.particles[index];
        let mut injected = WeightedParticle::new(pose, slot.probability());
        injected.set_weight(slot.weight());
        *slot = injected;
    }

    // --- Private helpers ---

    fn gaussian(&mut self, std_dev: f64) -> f64 {
        match Normal::new(0.0, std_dev) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => 0.0,
        }
    }

    fn perturbed(&mut self, pose: &Pose, spread: PoseSpread) -> Pose {
        let offset = Vector3::new(
            self.gaussian(spread.position),
            self.gaussian(spread.position),
            0.0,
        );
        let turn = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.gaussian(spread.yaw));
        Isometry3::from_parts(
            Translation3::from(pose.translation.vector + offset),
            turn * pose.rotation,
        )
    }

    /// Height of the root body such that the camera sits `camera_height`
    /// above the ground.
    fn root_height(&self, rotation: &Orientation, camera_height: f64) -> f64 {
        camera_height - (rotation * self.camera_to_root.translation.vector).z
    }

    fn decay_confidence(&mut self) {
        self.info.confidence *= self.config.confidence_decay;
    }

    fn record_sensor(&mut self, name: &str, time: Time) {
        if let Some(sensor) = self.sensors.get_mut(name) {
            sensor.record(time);
        }
    }

    /// Reconstructs depth for every observation that lacks it. Observations
    /// whose ray never meets the ground are dropped.
    fn complete_depth(
        &self,
        points: &[PointObservation],
        lines: &[LineObservation],
        tilt: &Orientation,
        camera_height: f64,
    ) -> (Vec<PointObservation>, Vec<LineObservation>) {
        let origin = self.camera_to_root.translation.vector;
        let ground = |direction: &Position| intersect_ground(direction, &origin, tilt, camera_height);

        let points = points
            .iter()
            .filter_map(|observation| {
                if observation.has_depth() {
                    return Some(observation.clone());
                }
                let Some(position) = ground(observation.position()) else {
                    debug!(kind = observation.kind(), "point above horizon, dropped");
                    return None;
                };
                let mut completed = observation.clone();
                completed.assign_depth_info(position);
                Some(completed)
            })
            .collect();

        let lines = lines
            .iter()
            .filter_map(|observation| {
                if observation.has_depth() {
                    return Some(observation.clone());
                }
                let (Some(start), Some(end)) = (ground(observation.start()), ground(observation.end()))
                else {
                    debug!(kind = observation.kind(), "line above horizon, dropped");
                    return None;
                };
                let mut completed = observation.clone();
                completed.assign_depth_info(start, end);
                Some(completed)
            })
            .collect();

        (points, lines)
    }

    fn current_estimate(&self) -> Pose {
        self.config
            .estimate
            .estimate(&self.particles)
            .unwrap_or(self.info.localized_pose)
    }

    fn publish(&mut self, time: Time, raw: Pose) {
        let previous = self.info.localized_position();
        let raw_position = raw.translation.vector;
        let smoothed = self
            .output_filter
            .filter_position(Some(&raw_position), Some(&previous), None)
            .unwrap_or(raw_position);

        self.info = LocalizationInfo {
            time,
            localized_pose: Isometry3::from_parts(Translation3::from(smoothed), raw.rotation),
            unfiltered_position: raw_position,
            confidence: self.info.confidence,
        };
    }
}

impl Localizer for ParticleLocalizer {
    fn reset(&mut self, time: Time, initial_pose: Option<&Pose>) {
        let center = initial_pose.copied().unwrap_or_else(Pose::identity);
        let n = self.config.particle_count;
        let spread = self.config.initial_spread;

        let mut particles = Vec::with_capacity(n);
        for _ in 0..n {
            let pose = self.perturbed(&center, spread);
            particles.push(WeightedParticle::new(pose, 1.0 / n as f64));
        }
        self.particles = particles;
        self.status = LocalizerStatus::Tracking;
        self.last_predict = Some(time);
        self.output_filter.reset();

        let confidence = if initial_pose.is_some() { 1.0 } else { 0.0 };
        self.info = LocalizationInfo::new(time, center, confidence);
        debug!(
            x = center.translation.vector.x,
            y = center.translation.vector.y,
            yaw = yaw_of(&center.rotation),
            "localizer reset"
        );
    }

    fn set_camera_mount(&mut self, camera_to_root: &Pose) {
        self.camera_to_root = *camera_to_root;
    }

    fn predict(
        &mut self,
        time: Time,
        odometry: Option<&Pose>,
        orientation_estimate: Option<&Orientation>,
        camera_height: f64,
    ) -> bool {
        if self.status == LocalizerStatus::Uninitialized {
            debug!("predict skipped, localizer not initialized");
            return false;
        }
        if odometry.is_none() && orientation_estimate.is_none() {
            debug!("predict skipped, no motion information");
            return false;
        }

        let noise = self.config.odometry_noise;
        let rotation_noise = self.config.rotation_noise;
        let mut particles = std::mem::take(&mut self.particles);
        for particle in particles.iter_mut() {
            if let Some(delta) = odometry {
                let translation = delta.translation.vector
                    + Vector3::new(self.gaussian(noise.position), self.gaussian(noise.position), 0.0);
                let yaw_delta = yaw_of(&delta.rotation) + self.gaussian(noise.yaw);
                particle.update_motion(&translation, yaw_delta);
            }
            if let Some(orientation) = orientation_estimate {
                let (roll, pitch, yaw) = orientation.euler_angles();
                let noisy = UnitQuaternion::from_euler_angles(
                    roll,
                    pitch,
                    yaw + self.gaussian(rotation_noise),
                );
                particle.update_rotation(&noisy);
            }
            if camera_height > 0.0 {
                particle.set_height(self.root_height(particle.orientation(), camera_height));
            }
        }
        self.particles = particles;

        if odometry.is_some() {
            self.record_sensor(ODOMETRY_SENSOR, time);
        }
        if orientation_estimate.is_some() {
            self.record_sensor(INERTIAL_SENSOR, time);
        }
        self.last_predict = Some(time);
        true
    }

    fn correct(
        &mut self,
        time: Time,
        map: &FeatureMap,
        point_observations: &[PointObservation],
        line_observations: &[LineObservation],
        orientation_estimate: Option<&Orientation>,
        camera_height: f64,
    ) -> bool {
        if self.status == LocalizerStatus::Uninitialized {
            debug!("correct skipped, localizer not initialized");
            return false;
        }

        // 1. Depth completion
        let estimate = self.current_estimate();
        let tilt = tilt_of(orientation_estimate.unwrap_or(&estimate.rotation));
        let (points, lines) =
            self.complete_depth(point_observations, line_observations, &tilt, camera_height);

        // 2. Data association against the current best estimate
        let points = associate_points(&points, map, &estimate, &self.config.association);
        let lines = associate_lines(&lines, map, &estimate, &self.config.association);
        if points.is_empty() && lines.is_empty() {
            debug!(time, "no usable observations, estimate aged");
            self.decay_confidence();
            return false;
        }

        // 3. Per-particle importance
        let seen: HashSet<&str> = points.iter().filter_map(|o| o.name()).collect();
        let sigma = self.config.observation_sigma;
        let mut weight_sum = 0.0;
        for particle in self.particles.iter_mut() {
            let likelihood =
                observation_likelihood(particle.pose(), map, &points, &lines, sigma).unwrap_or(0.0);
            let visibility =
                self.visibility
                    .visibility_factor(particle.pose(), &self.camera_to_root, map, &seen);
            let weight = likelihood * visibility;
            particle.set_weight(weight);
            weight_sum += weight;
        }

        // 4. Normalization
        if self.normalize_importance(weight_sum) {
            self.info.confidence = (weight_sum / self.particles.len() as f64).clamp(0.0, 1.0);

            // 5. Resampling
            if self.config.resampling.should_resample(&self.particles) {
                self.particles = super::systematic_resample(&self.particles, &mut self.rng);
            }
        } else {
            self.decay_confidence();
        }

        // 6. Diversity injection
        let injected =
            (self.config.random_particle_fraction * self.particles.len() as f64).round() as usize;
        for _ in 0..injected {
            let index = self.rng.gen_range(0..self.particles.len());
            self.add_random_particle(index);
        }

        // 7. Best candidate
        let raw = self.current_estimate();
        self.publish(time, raw);
        self.record_sensor(CAMERA_SENSOR, time);
        true
    }

    fn get_state(&self) -> &LocalizationInfo {
        &self.info
    }

    fn sensors(&self) -> &HashMap<String, LocalizationSensor> {
        &self.sensors
    }
}
