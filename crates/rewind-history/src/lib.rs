//! Per-entity movement history and lag compensation.
//!
//! Records a bounded, time-ordered trail of each entity's pose, answers
//! "where was this entity at time T" for fair hit validation, lets a
//! locally controlled entity recover the pose at which it fired, and
//! forward-predicts remotely simulated entities on authoritative updates.
//!
//! All operations take the current simulation time explicitly; none of them
//! block, perform I/O, or panic in release builds.

pub mod ecs;
pub mod history;
pub mod latency;
pub mod remote;
pub mod rewind;
pub mod role;
pub mod rotator;
pub mod sample;
pub mod shot_sync;
pub mod smoothing;


pub use ecs::{
    Kinematics, MovementReplication, PendingFire, SimClock, apply_pending_fire,
    record_position_history,
};
pub use glam::Vec3;
pub use history::PositionHistory;
pub use latency::{LatencyEstimator, prediction_time_for_ping};
pub use remote::{
    AuthoritativeUpdate, MovementSolver, RemotePredictor, UpdateContext, UpdateOutcome,
};
pub use rewind::{rewind_location, rewind_offset, rewind_point};
pub use role::NetRole;
pub use rotator::Rotator;
pub use sample::PositionSample;
pub use shot_sync::ShotSynchronizer;
pub use smoothing::CorrectionSmoothing;
