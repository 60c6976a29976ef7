// kickoff_core/src/world_model/snapshot.rs

use std::collections::HashMap;

use crate::localization::LocalizationInfo;
use crate::types::{Position, Time};

/// Filtered state of one moving object, in the field frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    pub kind: String,
    pub position: Position,
    /// Finite difference of consecutive filtered positions.
    pub velocity: Position,
    /// Time of the last sighting that reached the filter.
    pub last_seen: Time,
    /// Whether the object was sighted in the frame that produced this snapshot.
    pub visible: bool,
}

/// Everything the agent knows after one update, handed out by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldSnapshot {
    pub time: Time,
    pub localization: LocalizationInfo,
    pub objects: HashMap<String, TrackedObject>,
}

impl WorldSnapshot {
    pub fn object(&self, kind: &str) -> Option<&TrackedObject> {
        self.objects.get(kind)
    }
}
