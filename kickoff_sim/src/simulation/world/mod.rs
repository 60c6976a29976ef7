// kickoff_sim/src/simulation/world/mod.rs

//! Ground truth of the simulated field: the walking robot and the ball.

mod ball;
mod robot;

pub use ball::BallSim;
pub use robot::RobotWalker;
