// kickoff_core/src/filtering/ball_kalman.rs

use nalgebra::{DMatrix, DVector, Vector3};
use serde::Deserialize;
use tracing::{debug, warn};

use super::PositionFilter;
use crate::error::{EstimationError, Result};
use crate::frames::layout::{ball_state_layout, BALL_STATE_DIM};
use crate::frames::{FrameAwareState, FrameId, StateVariable};
use crate::types::{is_finite, Position};

// --- Configuration ---

/// Physical constants of the bouncing-ball transition model.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BallPhysics {
    /// Linear velocity decay per second (negative slows the ball down).
    pub drag: f64,
    /// Vertical acceleration in m/s^2.
    pub gravity: f64,
    /// Factor applied to horizontal velocity on ground contact.
    pub horizontal_restitution: f64,
    /// Factor applied to vertical velocity on ground contact. Negative, since
    /// the ball leaves the ground in the opposite direction.
    pub vertical_restitution: f64,
    /// Fixed step between two filter updates, in seconds.
    pub dt: f64,
}

impl Default for BallPhysics {
    fn default() -> Self {
        Self {
            drag: -0.4,
            gravity: -9.81,
            horizontal_restitution: 0.75,
            vertical_restitution: -0.67,
            dt: 0.06,
        }
    }
}

/// Noise figures of the bouncing-ball filter.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BallKalmanNoise {
    /// Variance of a position measurement (m^2).
    pub position_measurement: f64,
    /// Variance of a velocity measurement ((m/s)^2).
    pub velocity_measurement: f64,
    /// Diagonal process noise added on every prediction.
    pub process: f64,
    /// Diagonal of `P` after a reset.
    pub initial_uncertainty: f64,
}

impl Default for BallKalmanNoise {
    fn default() -> Self {
        Self {
            position_measurement: 0.02 * 0.02,
            velocity_measurement: 0.01 * 0.01,
            process: 1e-4,
            initial_uncertainty: 1.0,
        }
    }
}

// --- Filter ---

/// Kalman filter over `[x, vx, y, vy, z, vz]` with drag, gravity and ground bounces.
///
/// Every call advances the model by one fixed `dt`, including calls without a
/// sample, which only predict. The measurement is the full state (observed
/// position plus a speed), so `H = I`. The speed is taken from `speed` if
/// given. Otherwise it is differenced from `old`, which assumes `old` was
/// observed exactly one cycle earlier.
#[derive(Debug, Clone)]
pub struct BouncingBallFilter {
    physics: BallPhysics,
    noise: BallKalmanNoise,
    frame: FrameId,
    /// `None` until the first sample after construction or reset.
    state: Option<FrameAwareState>,
    process_noise_q: DMatrix<f64>,
    measurement_noise_r: DMatrix<f64>,
}

impl BouncingBallFilter {
    pub fn new(physics: BallPhysics, noise: BallKalmanNoise) -> Result<Self> {
        if !(physics.dt > 0.0) {
            return Err(EstimationError::parameter(
                "dt",
                format!("must be positive, got {}", physics.dt),
            ));
        }
        for (name, value) in [
            ("position_measurement", noise.position_measurement),
            ("velocity_measurement", noise.velocity_measurement),
            ("process", noise.process),
            ("initial_uncertainty", noise.initial_uncertainty),
        ] {
            if !(value >= 0.0) {
                return Err(EstimationError::parameter(
                    name,
                    format!("must be non-negative, got {value}"),
                ));
            }
        }

        Ok(Self::with_config(physics, noise))
    }

    fn with_config(physics: BallPhysics, noise: BallKalmanNoise) -> Self {
        let r_diag = DVector::from_fn(BALL_STATE_DIM, |i, _| {
            if i % 2 == 0 {
                noise.position_measurement
            } else {
                noise.velocity_measurement
            }
        });
        Self {
            physics,
            noise,
            frame: FrameId::Global,
            state: None,
            process_noise_q: DMatrix::<f64>::identity(BALL_STATE_DIM, BALL_STATE_DIM)
                * noise.process,
            measurement_noise_r: DMatrix::from_diagonal(&r_diag),
        }
    }

    pub fn physics(&self) -> &BallPhysics {
        &self.physics
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn position(&self) -> Option<Position> {
        self.state.as_ref().map(|s| s.position(self.frame))
    }

    pub fn velocity(&self) -> Option<Position> {
        self.state.as_ref().map(|s| s.velocity(self.frame))
    }

    pub fn covariance(&self) -> Option<&DMatrix<f64>> {
        self.state.as_ref().map(|s| &s.covariance)
    }

    /// (Re)starts the filter at a known position and velocity with the
    /// configured initial uncertainty.
    pub fn initialize(&mut self, position: &Position, velocity: &Position) {
        let mut state = FrameAwareState::new(
            ball_state_layout(self.frame),
            self.noise.initial_uncertainty,
            0.0,
        );
        state.set_vector3(self.position_axes(), position);
        state.set_vector3(self.velocity_axes(), velocity);
        self.state = Some(state);
    }

    /// Advances the state by one `dt`.
    ///
    /// Returns the velocity at impact if the ball hit the ground during this
    /// step, in which case the bounce transform has already been applied.
    pub fn predict(&mut self) -> Option<Position> {
        let a = self.transition_matrix();
        let b = self.gravity_input();
        let d = self.bounce_matrix();
        let dt = self.physics.dt;
        let state = self.state.as_mut()?;

        let mut x_pred = &a * &state.vector + b;
        let mut f_jac = a;

        let z_idx = 4;
        let mut impact = None;
        if x_pred[z_idx] < 0.0 {
            let velocity = Vector3::new(x_pred[1], x_pred[3], x_pred[5]);
            x_pred = &d * x_pred;
            f_jac = d * f_jac;
            impact = Some(velocity);
        }

        // P_k+1 = F * P_k * F^T + Q
        state.covariance = &f_jac * &state.covariance * f_jac.transpose() + &self.process_noise_q;
        state.vector = x_pred;
        state.last_update_timestamp += dt;

        if let Some(v) = impact {
            debug!(impact_speed = v.z, "ball bounce predicted");
        }
        impact
    }

    /// Fuses a full position+velocity measurement.
    ///
    /// Returns `false` when the innovation covariance cannot be inverted; the
    /// state is then left as predicted.
    fn update(&mut self, position: &Position, velocity: &Position) -> bool {
        let (pos_axes, vel_axes) = (self.position_axes(), self.velocity_axes());
        let Some(state) = self.state.as_mut() else {
            return false;
        };

        let mut z = DVector::zeros(BALL_STATE_DIM);
        for (i, var) in pos_axes.iter().enumerate() {
            if let Some(idx) = state.find_idx(var) {
                z[idx] = position[i];
            }
        }
        for (i, var) in vel_axes.iter().enumerate() {
            if let Some(idx) = state.find_idx(var) {
                z[idx] = velocity[i];
            }
        }

        // K = P * (P + R)^-1
        let s = &state.covariance + &self.measurement_noise_r;
        let Some(s_inv) = s.try_inverse() else {
            return false;
        };
        let k_gain = &state.covariance * s_inv;

        let y = z - &state.vector;
        state.vector += &k_gain * y;
        let i = DMatrix::<f64>::identity(BALL_STATE_DIM, BALL_STATE_DIM);
        state.covariance = (i - k_gain) * &state.covariance;
        true
    }

    // --- Private helpers ---

    fn position_axes(&self) -> [StateVariable; 3] {
        [
            StateVariable::Px(self.frame),
            StateVariable::Py(self.frame),
            StateVariable::Pz(self.frame),
        ]
    }

    fn velocity_axes(&self) -> [StateVariable; 3] {
        [
            StateVariable::Vx(self.frame),
            StateVariable::Vy(self.frame),
            StateVariable::Vz(self.frame),
        ]
    }

    /// Block-diagonal transition: `v' = (1 + drag*dt) v`, `p' = p + dt v'`.
    fn transition_matrix(&self) -> DMatrix<f64> {
        let dt = self.physics.dt;
        let decay = 1.0 + self.physics.drag * dt;
        let mut a = DMatrix::<f64>::zeros(BALL_STATE_DIM, BALL_STATE_DIM);
        for axis in 0..3 {
            let (p, v) = (2 * axis, 2 * axis + 1);
            a[(p, p)] = 1.0;
            a[(p, v)] = dt * decay;
            a[(v, v)] = decay;
        }
        a
    }

    /// Gravity enters the vertical velocity and, through it, the height.
    fn gravity_input(&self) -> DVector<f64> {
        let dt = self.physics.dt;
        let dv = self.physics.gravity * dt;
        let mut b = DVector::zeros(BALL_STATE_DIM);
        b[5] = dv;
        b[4] = dv * dt;
        b
    }

    /// Ground contact: damp horizontal velocity, invert and damp vertical
    /// velocity, and mirror the height back above the ground.
    fn bounce_matrix(&self) -> DMatrix<f64> {
        let h = self.physics.horizontal_restitution;
        DMatrix::from_diagonal(&DVector::from_vec(vec![
            1.0,
            h,
            1.0,
            h,
            -1.0,
            self.physics.vertical_restitution,
        ]))
    }
}

impl Default for BouncingBallFilter {
    fn default() -> Self {
        Self::with_config(BallPhysics::default(), BallKalmanNoise::default())
    }
}

impl PositionFilter for BouncingBallFilter {
    fn filter_position(
        &mut self,
        new: Option<&Position>,
        old: Option<&Position>,
        speed: Option<&Position>,
    ) -> Option<Position> {
        let Some(&new) = new.filter(|p| is_finite(p)) else {
            self.predict();
            return None;
        };
        let differenced = old.map(|old| (new - old) / self.physics.dt);

        if self.state.is_none() {
            let velocity = speed.copied().or(differenced).unwrap_or_else(Vector3::zeros);
            self.initialize(&new, &velocity);
            return Some(new);
        }

        self.predict();
        let predicted_velocity = self.velocity().unwrap_or_else(Vector3::zeros);
        let velocity = speed.copied().or(differenced).unwrap_or(predicted_velocity);

        if !self.update(&new, &velocity) {
            warn!("singular innovation covariance in ball filter, passing measurement through");
            self.initialize(&new, &velocity);
            return Some(new);
        }

        match &self.state {
            Some(state) if state.is_finite() => Some(state.position(self.frame)),
            _ => {
                warn!("ball filter state diverged, reinitializing from measurement");
                self.initialize(&new, &velocity);
                Some(new)
            }
        }
    }

    fn reset(&mut self) {
        self.state = None;
    }

    fn velocity_estimate(&self) -> Option<Position> {
        self.velocity()
    }

    fn name(&self) -> &'static str {
        "BouncingBall"
    }
}
