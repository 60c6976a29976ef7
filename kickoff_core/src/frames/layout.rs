// kickoff_core/src/frames/layout.rs
use crate::frames::{FrameId, StateVariable};

/// The dimension of the bouncing-ball state vector.
pub const BALL_STATE_DIM: usize = 6;

/// Returns the interleaved position/velocity layout used by the bouncing-ball
/// Kalman filter: `[x, vx, y, vy, z, vz]`.
///
/// Keeping each axis' position next to its velocity makes the transition matrix
/// block-diagonal, one 2x2 block per axis.
pub fn ball_state_layout(frame: FrameId) -> Vec<StateVariable> {
    vec![
        StateVariable::Px(frame),
        StateVariable::Vx(frame),
        StateVariable::Py(frame),
        StateVariable::Vy(frame),
        StateVariable::Pz(frame),
        StateVariable::Vz(frame),
    ]
}
