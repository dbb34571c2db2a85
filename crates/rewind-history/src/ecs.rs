//! ECS integration: per-entity history components and the recording systems.
//!
//! Call order each tick is a contract of the host schedule: the movement
//! solver writes [`Kinematics`] first, then [`record_position_history`]
//! appends a sample, then [`apply_pending_fire`] flags it. Rendering and hit
//! validation read afterwards.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rewind_config::HistoryConfig;
use tracing::debug;

use crate::history::PositionHistory;
use crate::remote::MovementSolver;
use crate::role::NetRole;
use crate::rotator::Rotator;
use crate::sample::PositionSample;
use crate::shot_sync::ShotSynchronizer;

/// Current simulation time in seconds, advanced by the host each tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    /// Simulation seconds.
    pub now: f64,
}

/// Movement solver output for the current tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Kinematics {
    /// World-space location.
    pub position: Vec3,
    /// View rotation.
    pub rotation: Rotator,
    /// Velocity.
    pub velocity: Vec3,
    /// The solver moved the entity discontinuously this tick. Cleared once
    /// recorded.
    pub just_teleported: bool,
    /// Solver's fixed-step clock, for diagnostics.
    pub synch_time: f64,
}

/// Lets [`RemotePredictor`](crate::RemotePredictor) drive an entity's
/// kinematics directly. A snap raises `just_teleported`, so the next
/// recorded sample carries the teleport flag.
///
/// There is no collision world at this level; hosts with blocking geometry
/// wrap `Kinematics` in their own solver.
impl MovementSolver for Kinematics {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Rotator {
        self.rotation
    }

    fn set_location_and_rotation(&mut self, position: Vec3, rotation: Rotator) {
        self.position = position;
        self.rotation = rotation;
    }

    fn set_rotation(&mut self, rotation: Rotator) {
        self.rotation = rotation;
    }

    fn set_simulated_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn set_just_teleported(&mut self, just_teleported: bool) {
        self.just_teleported = just_teleported;
    }

    fn simulate_movement(&mut self, delta_seconds: f64) {
        self.position += self.velocity * delta_seconds as f32;
    }

    fn is_encroaching(&self, _position: Vec3, _rotation: Rotator) -> bool {
        false
    }
}

/// Movement history of one entity together with its network role.
#[derive(Component, Debug, Clone)]
pub struct MovementReplication {
    /// Recorded trail.
    pub history: PositionHistory,
    role: NetRole,
}

impl MovementReplication {
    /// Creates an empty history for an entity in `role`.
    pub fn new(role: NetRole, config: &HistoryConfig) -> Self {
        Self {
            history: PositionHistory::from_config(config),
            role,
        }
    }

    /// Current network role.
    pub fn role(&self) -> NetRole {
        self.role
    }

    /// Hands control of the entity to a new role.
    ///
    /// History is kept; only its interpretation changes.
    pub fn set_role(&mut self, role: NetRole) {
        if role != self.role {
            debug!(from = %self.role, to = %role, "movement role changed");
            self.role = role;
        }
    }

    /// Starts a fresh trail, e.g. on respawn into a new identity.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// Marker inserted by the input/weapon system when a fire command is issued.
///
/// Removed once a recorded sample has been flagged; if the history is still
/// empty the marker stays and is retried next tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PendingFire;

/// Appends this tick's pose to every entity's history.
pub fn record_position_history(
    clock: Res<SimClock>,
    mut query: Query<(&mut Kinematics, &mut MovementReplication)>,
) {
    let now = clock.now;
    for (mut kinematics, mut replication) in &mut query {
        let sample = PositionSample::new(
            kinematics.position,
            kinematics.rotation,
            kinematics.velocity,
            now,
        )
        .with_teleported(kinematics.just_teleported)
        .with_synch_time(kinematics.synch_time);
        replication.history.record(sample, now);

        if kinematics.just_teleported {
            kinematics.just_teleported = false;
        }
    }
}

/// Flags the newest sample of every entity with a [`PendingFire`] marker.
///
/// Only entities simulated on this peer can fire from their own history; a
/// marker on a remote proxy is dropped.
pub fn apply_pending_fire(
    mut commands: Commands,
    mut query: Query<(Entity, &mut MovementReplication), With<PendingFire>>,
) {
    let sync = ShotSynchronizer::default();
    for (entity, mut replication) in &mut query {
        if !replication.role().is_local_authority() {
            debug!(?entity, role = %replication.role(), "dropping fire marker on remote entity");
            commands.entity(entity).remove::<PendingFire>();
            continue;
        }
        if sync.notify_pending_fire(&mut replication.history) {
            commands.entity(entity).remove::<PendingFire>();
        }
    }
}
