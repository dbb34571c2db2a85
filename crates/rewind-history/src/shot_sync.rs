//! Shot synchronization: recovering the pose a shot was fired from.
//!
//! Firing effects are often realized a few ticks after the input was sampled
//! (animation wind-up, server confirmation). The input system flags the
//! newest history sample when a shot is fired; effects later look the flag
//! up, within a bounded delay, and spawn at the flagged pose instead of the
//! entity's current one.

use glam::Vec3;
use rewind_config::HistoryConfig;
use tracing::trace;

use crate::history::PositionHistory;
use crate::rotator::Rotator;
use crate::sample::PositionSample;

/// Delayed-shot lookups bounded by `max_shot_synch_delay` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotSynchronizer {
    max_shot_synch_delay: f64,
}

impl ShotSynchronizer {
    /// Creates a synchronizer that ignores flags older than `max_shot_synch_delay`.
    pub fn new(max_shot_synch_delay: f64) -> Self {
        Self {
            max_shot_synch_delay,
        }
    }

    /// Creates a synchronizer from the configured delay.
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(config.max_shot_synch_delay)
    }

    /// Seconds a flagged sample remains eligible.
    pub fn max_delay(&self) -> f64 {
        self.max_shot_synch_delay
    }

    /// Flags the most recent sample as the one a shot was fired from.
    ///
    /// Returns `false` when the history is empty; nothing is flagged and the
    /// caller should try again after the next sample is recorded.
    pub fn notify_pending_fire(&self, history: &mut PositionHistory) -> bool {
        match history.latest_mut() {
            Some(latest) => {
                latest.shot_spawned = true;
                trace!(timestamp = latest.timestamp, "flagged pending fire");
                true
            }
            None => false,
        }
    }

    /// Newest flagged sample no older than the delay window at `now`.
    ///
    /// The scan runs newest to oldest and stops at the first sample beyond
    /// the window, so a stale flag is never reported.
    pub fn delayed_shot<'a>(
        &self,
        history: &'a PositionHistory,
        now: f64,
    ) -> Option<&'a PositionSample> {
        for sample in history.iter().rev() {
            if sample.age(now) > self.max_shot_synch_delay {
                break;
            }
            if sample.shot_spawned {
                return Some(sample);
            }
        }
        None
    }

    /// Returns `true` if a shot was flagged within the delay window.
    pub fn delayed_shot_found(&self, history: &PositionHistory, now: f64) -> bool {
        self.delayed_shot(history, now).is_some()
    }

    /// Position of the flagged sample, or `current_position` if none is in range.
    pub fn delayed_shot_position(
        &self,
        history: &PositionHistory,
        now: f64,
        current_position: Vec3,
    ) -> Vec3 {
        self.delayed_shot(history, now)
            .map_or(current_position, |s| s.position)
    }

    /// Orientation of the flagged sample, or `current_rotation` if none is in range.
    pub fn delayed_shot_rotation(
        &self,
        history: &PositionHistory,
        now: f64,
        current_rotation: Rotator,
    ) -> Rotator {
        self.delayed_shot(history, now)
            .map_or(current_rotation, |s| s.orientation)
    }
}

impl Default for ShotSynchronizer {
    fn default() -> Self {
        Self::from_config(&HistoryConfig::default())
    }
}
