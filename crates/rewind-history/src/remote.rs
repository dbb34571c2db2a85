//! Forward prediction of remotely simulated entities.
//!
//! When an authoritative pose arrives for an entity simulated elsewhere, the
//! pose is already `prediction_time` seconds old from this peer's view. The
//! predictor snaps the entity to it and asks the movement solver to advance
//! that much simulated time at once, so the entity is drawn roughly where it
//! is now rather than where it was when the update was captured.

use glam::Vec3;
use rewind_config::PredictionConfig;
use tracing::{debug, trace};

use crate::role::NetRole;
use crate::rotator::Rotator;
use crate::smoothing::CorrectionSmoothing;

// ---------------------------------------------------------------------------
// MovementSolver
// ---------------------------------------------------------------------------

/// The external locomotion solver that owns an entity's transform.
pub trait MovementSolver {
    /// Current (rendered) location.
    fn position(&self) -> Vec3;
    /// Current rotation.
    fn rotation(&self) -> Rotator;
    /// Teleport-style transform assignment; no sweep, no base change.
    fn set_location_and_rotation(&mut self, position: Vec3, rotation: Rotator);
    /// Rotation-only change; position is left untouched.
    fn set_rotation(&mut self, rotation: Rotator);
    /// Velocity the solver extrapolates with between authoritative updates.
    fn set_simulated_velocity(&mut self, velocity: Vec3);
    /// Tells downstream smoothing that the last transform change was a jump,
    /// not ordinary motion.
    fn set_just_teleported(&mut self, just_teleported: bool);
    /// Advances the entity's movement by `delta_seconds` of simulated time.
    fn simulate_movement(&mut self, delta_seconds: f64);
    /// Whether the entity would overlap blocking geometry at this transform.
    fn is_encroaching(&self, position: Vec3, rotation: Rotator) -> bool;
}

// ---------------------------------------------------------------------------
// Update types
// ---------------------------------------------------------------------------

/// Already-decoded authoritative movement state from the owning peer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthoritativeUpdate {
    /// Authoritative location.
    pub position: Vec3,
    /// Authoritative rotation.
    pub rotation: Rotator,
    /// Authoritative velocity.
    pub velocity: Vec3,
}

/// Per-update facts about the receiving entity and the local viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateContext {
    /// Role of the entity on this peer.
    pub role: NetRole,
    /// Estimated age of the update in seconds (see [`LatencyEstimator`](crate::LatencyEstimator)).
    pub prediction_time: f64,
    /// The local viewer's camera is attached to this entity.
    pub is_view_target: bool,
    /// The entity was created this tick; its spawn location came from the
    /// same update, so it is always treated as changed.
    pub spawned_this_tick: bool,
}

/// What [`RemotePredictor::apply_authoritative_update`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOutcome {
    /// Transform was snapped to the update.
    Snapped {
        /// Seconds of forward simulation applied, if any.
        forward_simulated: Option<f64>,
        /// The new location overlapped geometry; simulated gravity is off.
        obstructed: bool,
    },
    /// Only the rotation changed.
    Rotated,
    /// Position and rotation already matched.
    Unchanged,
    /// The entity's role does not accept authoritative updates.
    Ignored,
}

// ---------------------------------------------------------------------------
// RemotePredictor
// ---------------------------------------------------------------------------

/// Per-entity state for applying authoritative updates to a remote proxy.
#[derive(Debug, Clone)]
pub struct RemotePredictor {
    sim_gravity_disabled: bool,
    smoothing: CorrectionSmoothing,
}

impl Default for RemotePredictor {
    fn default() -> Self {
        Self::from_config(&PredictionConfig::default())
    }
}

impl RemotePredictor {
    /// Creates a predictor with correction smoothing from `config`.
    pub fn from_config(config: &PredictionConfig) -> Self {
        Self {
            sim_gravity_disabled: false,
            smoothing: CorrectionSmoothing::from_config(config),
        }
    }

    /// Set while the last snapped location overlapped blocking geometry.
    pub fn sim_gravity_disabled(&self) -> bool {
        self.sim_gravity_disabled
    }

    /// Visual correction smoothing state.
    pub fn smoothing(&self) -> &CorrectionSmoothing {
        &self.smoothing
    }

    /// Decays the visual correction offset; call once per rendered frame.
    pub fn update(&mut self, dt: f32) {
        self.smoothing.update(dt);
    }

    /// Where to draw the entity given its logical `position`.
    pub fn render_position(&self, position: Vec3) -> Vec3 {
        if self.smoothing.is_zero() {
            return position;
        }
        position + self.smoothing.visual_offset()
    }

    /// Applies an authoritative pose to `solver`.
    ///
    /// If the location changed (or the entity just spawned) the transform is
    /// assigned directly, the solver is told it just teleported, and, unless
    /// the entity is the local view target, it is forward-simulated by
    /// `ctx.prediction_time`. A rotation-only change rotates in place.
    /// An overlapping target location does not block the snap; it disables
    /// simulated gravity until an unobstructed update arrives.
    pub fn apply_authoritative_update<S: MovementSolver + ?Sized>(
        &mut self,
        solver: &mut S,
        update: &AuthoritativeUpdate,
        ctx: &UpdateContext,
    ) -> UpdateOutcome {
        if !ctx.role.accepts_authoritative_updates() {
            trace!(role = %ctx.role, "ignoring authoritative update");
            return UpdateOutcome::Ignored;
        }

        solver.set_simulated_velocity(update.velocity);

        let old_position = solver.position();
        if update.position != old_position || ctx.spawned_this_tick {
            let obstructed = solver.is_encroaching(update.position, update.rotation);
            self.sim_gravity_disabled = obstructed;

            solver.set_location_and_rotation(update.position, update.rotation);
            solver.set_just_teleported(true);

            let forward_simulated = if ctx.prediction_time > 0.0 && !ctx.is_view_target {
                solver.simulate_movement(ctx.prediction_time);
                Some(ctx.prediction_time)
            } else {
                None
            };

            self.smoothing
                .apply_correction(solver.position() - old_position);

            debug!(
                obstructed,
                prediction_time = ctx.prediction_time,
                "snapped remote entity to authoritative update"
            );
            UpdateOutcome::Snapped {
                forward_simulated,
                obstructed,
            }
        } else if update.rotation != solver.rotation() {
            solver.set_rotation(update.rotation);
            UpdateOutcome::Rotated
        } else {
            UpdateOutcome::Unchanged
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
