// kickoff_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::filtering::PositionFilter;
pub use crate::localization::{Localizer, VisibilityModel};
pub use crate::world_model::{BodyModel, InertialSensor};

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::error::{EstimationError, Result};
pub use crate::frames::{FrameAwareState, FrameId, StateVariable};
pub use crate::localization::{LocalizationInfo, WeightedParticle};
pub use crate::map::{FeatureMap, FieldDimensions, LineFeature, PointFeature};
pub use crate::perception::{LineObservation, PointObservation};
pub use crate::types::{Orientation, Pose, Position, Time};
pub use crate::world_model::{ObjectSighting, PerceptionFrame, TrackedObject, WorldSnapshot};

// --- Configuration ---
pub use crate::filtering::{BallKalmanNoise, BallPhysics, PositionFilterConfig};
pub use crate::localization::LocalizerConfig;
pub use crate::world_model::WorldModelConfig;

// --- Concrete Implementations (Export common ones for convenience) ---
pub use crate::filtering::BouncingBallFilter;
pub use crate::localization::ParticleLocalizer;
pub use crate::world_model::WorldModel;
