// kickoff_core/src/frames.rs

use nalgebra::{DMatrix, DVector, Vector3};
use std::hash::Hash;

pub mod layout;

/// A unique, hashable identifier for the coordinate frames the agent reasons in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameId {
    /// The field frame. Origin at the centre spot, +X towards the opponent goal, +Z up.
    Global,
    /// The agent's root body (torso) frame.
    Root,
    /// The camera frame in which raw perception arrives.
    Camera,
}

/// An enum that defines every variable that can exist in a filter state vector.
/// The FrameId specifies which frame the variable is expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateVariable {
    // --- Cartesian Position ---
    Px(FrameId),
    Py(FrameId),
    Pz(FrameId),
    // --- Cartesian Velocity ---
    Vx(FrameId),
    Vy(FrameId),
    Vz(FrameId),
}

/// The "smart" state object used by filters. It bundles the state vector
/// with its schema (the layout), covariance, and timestamp.
#[derive(Debug, Clone)]
pub struct FrameAwareState {
    /// The ordered "schema" of the state vector.
    pub layout: Vec<StateVariable>,
    /// The actual numerical data vector `x`.
    pub vector: DVector<f64>,
    /// The covariance matrix `P`.
    pub covariance: DMatrix<f64>,
    /// The timestamp of the last update.
    pub last_update_timestamp: f64,
}

impl FrameAwareState {
    /// Creates a new state with a given layout, initializing the vector to zero
    /// and the covariance to a scaled identity matrix.
    pub fn new(layout: Vec<StateVariable>, initial_covariance_val: f64, timestamp: f64) -> Self {
        let dim = layout.len();
        Self {
            layout,
            vector: DVector::zeros(dim),
            covariance: DMatrix::identity(dim, dim) * initial_covariance_val,
            last_update_timestamp: timestamp,
        }
    }

    /// Returns the dimension (number of rows) of the state vector.
    pub fn dim(&self) -> usize {
        self.layout.len()
    }

    /// Finds the index of a specific `StateVariable` in the layout.
    pub fn find_idx(&self, var: &StateVariable) -> Option<usize> {
        self.layout.iter().position(|v| v == var)
    }

    /// Reads a 3-vector out of the state, given the variables for each axis.
    /// Axes missing from the layout read as zero.
    pub fn get_vector3(&self, axes: [StateVariable; 3]) -> Vector3<f64> {
        let mut out = Vector3::zeros();
        for (i, var) in axes.iter().enumerate() {
            if let Some(idx) = self.find_idx(var) {
                out[i] = self.vector[idx];
            }
        }
        out
    }

    /// Writes a 3-vector into the state. Axes missing from the layout are skipped.
    pub fn set_vector3(&mut self, axes: [StateVariable; 3], value: &Vector3<f64>) {
        for (i, var) in axes.iter().enumerate() {
            if let Some(idx) = self.find_idx(var) {
                self.vector[idx] = value[i];
            }
        }
    }

    /// The position part of the state, expressed in `frame`.
    pub fn position(&self, frame: FrameId) -> Vector3<f64> {
        self.get_vector3([
            StateVariable::Px(frame),
            StateVariable::Py(frame),
            StateVariable::Pz(frame),
        ])
    }

    /// The velocity part of the state, expressed in `frame`.
    pub fn velocity(&self, frame: FrameId) -> Vector3<f64> {
        self.get_vector3([
            StateVariable::Vx(frame),
            StateVariable::Vy(frame),
            StateVariable::Vz(frame),
        ])
    }

    pub fn is_finite(&self) -> bool {
        self.vector.iter().all(|v| v.is_finite()) && self.covariance.iter().all(|v| v.is_finite())
    }
}
