//! A single timestamped observation of an entity's pose.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::rotator::Rotator;

/// One entry of a [`PositionHistory`](crate::PositionHistory).
///
/// Samples are small `Copy` values owned by the history that stores them.
/// Only `shot_spawned` is ever changed after recording (see
/// [`ShotSynchronizer::notify_pending_fire`](crate::ShotSynchronizer::notify_pending_fire)).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// World-space location at sample time.
    pub position: Vec3,
    /// View/facing orientation at sample time.
    pub orientation: Rotator,
    /// Instantaneous velocity at sample time.
    pub velocity: Vec3,
    /// This sample follows a discontinuous position change (spawn, teleporter,
    /// authoritative snap). Interpolation never crosses it.
    pub teleported: bool,
    /// A weapon discharge was attributed to this sample.
    pub shot_spawned: bool,
    /// Simulation time in seconds at which the sample was taken.
    pub timestamp: f64,
    /// Movement solver's internal clock, kept for synchronization
    /// diagnostics only.
    pub synch_time: f64,
}

impl PositionSample {
    /// Creates a plain sample: not teleported, no shot, zero synch time.
    pub fn new(position: Vec3, orientation: Rotator, velocity: Vec3, timestamp: f64) -> Self {
        Self {
            position,
            orientation,
            velocity,
            teleported: false,
            shot_spawned: false,
            timestamp,
            synch_time: 0.0,
        }
    }

    /// Marks whether this sample follows a teleport.
    pub fn with_teleported(mut self, teleported: bool) -> Self {
        self.teleported = teleported;
        self
    }

    /// Marks whether a shot was spawned at this sample.
    pub fn with_shot_spawned(mut self, shot_spawned: bool) -> Self {
        self.shot_spawned = shot_spawned;
        self
    }

    /// Attaches the movement solver's synch clock value.
    pub fn with_synch_time(mut self, synch_time: f64) -> Self {
        self.synch_time = synch_time;
        self
    }

    /// Seconds elapsed between this sample and `now`.
    pub fn age(&self, now: f64) -> f64 {
        now - self.timestamp
    }
}
