// kickoff_core/src/world_model/tracker.rs

use nalgebra::Vector3;

use super::TrackedObject;
use crate::filtering::PositionFilter;
use crate::types::{is_finite, Position, Time};

/// One moving object run through its own position filter.
#[derive(Debug, Clone)]
pub(crate) struct ObjectTracker {
    kind: String,
    filter: Box<dyn PositionFilter>,
    /// Raw position of the latest sighting and when it was made.
    last_observed: Option<(Time, Position)>,
    state: Option<TrackedObject>,
}

impl ObjectTracker {
    pub(crate) fn new(kind: &str, filter: Box<dyn PositionFilter>) -> Self {
        Self {
            kind: kind.to_string(),
            filter,
            last_observed: None,
            state: None,
        }
    }

    /// Feeds this frame's sighting (or its absence) and returns the current track.
    ///
    /// The raw speed between the last two sightings is measured over the time
    /// that actually passed, so a sighting after a gap does not look like a
    /// one-cycle jump.
    pub(crate) fn update(&mut self, time: Time, observed: Option<&Position>) -> Option<TrackedObject> {
        let old = self.last_observed.map(|(_, position)| position);
        let speed = match (observed, self.last_observed) {
            (Some(new), Some((seen_at, seen))) if time > seen_at => {
                Some((new - seen) / (time - seen_at))
            }
            _ => None,
        };
        let filtered = self
            .filter
            .filter_position(observed, old.as_ref(), speed.as_ref());

        match filtered {
            Some(position) => {
                let differenced = match &self.state {
                    Some(previous) if time > previous.last_seen => {
                        (position - previous.position) / (time - previous.last_seen)
                    }
                    Some(previous) => previous.velocity,
                    None => Vector3::zeros(),
                };
                let velocity = self.filter.velocity_estimate().unwrap_or(differenced);
                self.state = Some(TrackedObject {
                    kind: self.kind.clone(),
                    position,
                    velocity,
                    last_seen: time,
                    visible: true,
                });
            }
            None => {
                if let Some(previous) = self.state.as_mut() {
                    previous.visible = false;
                }
            }
        }

        if let Some(observed) = observed.filter(|p| is_finite(p)) {
            self.last_observed = Some((time, *observed));
        }
        self.state.clone()
    }

    pub(crate) fn reset(&mut self) {
        self.filter.reset();
        self.last_observed = None;
        self.state = None;
    }
}
