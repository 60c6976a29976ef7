// kickoff_sim/src/simulation/world/ball.rs

use nalgebra::Vector3;

use kickoff_core::filtering::BallPhysics;
use kickoff_core::types::Position;

use crate::simulation::config::BallConfig;
use crate::simulation::core::prng::SimulationRng;

/// Vertical speeds below this after a bounce end the bouncing; the ball rolls.
const SETTLE_SPEED: f64 = 0.3;

/// Ground-truth ball with drag, gravity, bounces and occasional kicks.
#[derive(Debug, Clone)]
pub struct BallSim {
    position: Position,
    velocity: Position,
    physics: BallPhysics,
    kick_interval: f64,
    kick_speed: f64,
    rest_speed: f64,
    since_kick: f64,
    field_half_extent: (f64, f64),
}

impl BallSim {
    pub fn new(config: &BallConfig, field_half_extent: (f64, f64)) -> Self {
        Self {
            position: Vector3::from(config.position),
            velocity: Vector3::from(config.velocity),
            physics: config.physics,
            kick_interval: config.kick_interval_seconds,
            kick_speed: config.kick_speed,
            rest_speed: config.rest_speed,
            since_kick: 0.0,
            field_half_extent,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn velocity(&self) -> &Position {
        &self.velocity
    }

    pub fn is_on_ground(&self) -> bool {
        self.position.z <= 0.0 && self.velocity.z == 0.0
    }

    pub fn step(&mut self, dt: f64, rng: &mut SimulationRng) {
        self.since_kick += dt;
        if self.kick_interval > 0.0 && self.since_kick >= self.kick_interval {
            self.since_kick = 0.0;
            let direction = rng.uniform(-std::f64::consts::PI, std::f64::consts::PI);
            let lift = rng.uniform(0.0, 0.4);
            self.velocity = Vector3::new(direction.cos(), direction.sin(), lift) * self.kick_speed;
        }

        let decay = 1.0 + self.physics.drag * dt;
        self.velocity.x *= decay;
        self.velocity.y *= decay;
        if self.is_on_ground() {
            if self.velocity.norm() < self.rest_speed {
                self.velocity = Vector3::zeros();
            }
        } else {
            self.velocity.z = self.velocity.z * decay + self.physics.gravity * dt;
        }
        self.position += self.velocity * dt;

        if self.position.z < 0.0 {
            self.position.z = -self.position.z;
            self.velocity.x *= self.physics.horizontal_restitution;
            self.velocity.y *= self.physics.horizontal_restitution;
            self.velocity.z *= self.physics.vertical_restitution;
            if self.velocity.z < SETTLE_SPEED {
                self.position.z = 0.0;
                self.velocity.z = 0.0;
            }
        }

        // Boards around the field.
        let (hx, hy) = self.field_half_extent;
        if self.position.x.abs() > hx {
            self.position.x = self.position.x.clamp(-hx, hx);
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y.abs() > hy {
            self.position.y = self.position.y.clamp(-hy, hy);
            self.velocity.y = -self.velocity.y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_ball(position: [f64; 3], velocity: [f64; 3]) -> BallSim {
        let config = BallConfig {
            position,
            velocity,
            kick_interval_seconds: 0.0,
            ..Default::default()
        };
        BallSim::new(&config, (16.0, 11.0))
    }

    #[test]
    fn test_dropped_ball_bounces_and_settles() {
        let mut ball = quiet_ball([0.0, 0.0, 1.0], [0.0, 0.0, 0.0]);
        let mut rng = SimulationRng::new(Some(1));
        let mut bounced = false;
        for _ in 0..200 {
            ball.step(0.02, &mut rng);
            if ball.velocity().z > 0.0 {
                bounced = true;
            }
            assert!(ball.position().z >= 0.0);
        }
        assert!(bounced);
        assert!(ball.is_on_ground());
    }

    #[test]
    fn test_rolling_ball_slows_to_rest() {
        let mut ball = quiet_ball([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let mut rng = SimulationRng::new(Some(1));
        for _ in 0..2000 {
            ball.step(0.06, &mut rng);
        }
        assert_eq!(*ball.velocity(), Vector3::zeros());
        assert!(ball.position().x > 0.0 && ball.position().x < 3.0);
    }
}
