//! Bounded, time-ordered record of an entity's recent movement.
//!
//! One [`PositionHistory`] is owned by each tracked entity. The movement
//! solver appends a sample every tick; samples older than the age window
//! are trimmed right after the append, except that one sample straddling
//! the window boundary is always retained so rewind queries near the edge
//! still have two points to interpolate between.

use std::collections::VecDeque;

use rewind_config::HistoryConfig;
use tracing::{debug, warn};

use crate::sample::PositionSample;

// ---------------------------------------------------------------------------
// PositionHistory
// ---------------------------------------------------------------------------

/// Oldest-first sequence of [`PositionSample`]s bounded by a maximum age.
///
/// Invariants after every [`record`](Self::record):
/// - timestamps are non-decreasing front to back;
/// - only the oldest sample may be older than `now - max_age`.
#[derive(Debug, Clone)]
pub struct PositionHistory {
    samples: VecDeque<PositionSample>,
    max_age: f64,
}

impl PositionHistory {
    /// Creates an empty history keeping `max_age` seconds of samples.
    pub fn new(max_age: f64) -> Self {
        Self {
            samples: VecDeque::new(),
            max_age,
        }
    }

    /// Creates an empty history sized from the configured window.
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(config.max_history_age)
    }

    /// Seconds of history retained (plus one straddling sample).
    pub fn max_age(&self) -> f64 {
        self.max_age
    }

    /// Widens the age window to at least `min_age`; never narrows it.
    ///
    /// Consumers that look further back than hit validation does (AI
    /// opponents aiming with a reaction delay, for instance) call this once
    /// at setup.
    pub fn raise_max_age(&mut self, min_age: f64) {
        if min_age > self.max_age {
            debug!(from = self.max_age, to = min_age, "raising position history age");
            self.max_age = min_age;
        }
    }

    /// Appends `sample` and trims samples that fell out of the window at `now`.
    ///
    /// Timestamps must not go backwards. Debug builds assert on it; release
    /// builds clamp the timestamp to the last recorded one so interpolation
    /// never sees a reversed interval.
    pub fn record(&mut self, mut sample: PositionSample, now: f64) {
        if let Some(last) = self.samples.back().map(|s| s.timestamp) {
            debug_assert!(
                sample.timestamp >= last,
                "position sample recorded out of order: {} < {last}",
                sample.timestamp
            );
            sample.timestamp = clamp_to_last(sample.timestamp, last);
        }
        self.samples.push_back(sample);
        self.trim(now);
    }

    /// Drops the oldest samples while the second-oldest is already beyond the
    /// age window, keeping exactly one sample past the boundary.
    pub fn trim(&mut self, now: f64) {
        let cutoff = now - self.max_age;
        while self.samples.len() > 1 && self.samples[1].timestamp < cutoff {
            self.samples.pop_front();
        }
    }

    /// Forgets every sample (entity destroyed or respawned as a new identity).
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if nothing has been recorded since creation or the last clear.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at `index`, oldest first.
    pub fn get(&self, index: usize) -> Option<&PositionSample> {
        self.samples.get(index)
    }

    /// Most recently recorded sample.
    pub fn latest(&self) -> Option<&PositionSample> {
        self.samples.back()
    }

    /// Oldest retained sample.
    pub fn oldest(&self) -> Option<&PositionSample> {
        self.samples.front()
    }

    /// Iterates samples oldest first. Use `.rev()` for a backward scan.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &PositionSample> + ExactSizeIterator {
        self.samples.iter()
    }

    pub(crate) fn latest_mut(&mut self) -> Option<&mut PositionSample> {
        self.samples.back_mut()
    }

    /// Interpolation-safe copy of the trail.
    ///
    /// Samples sharing a timestamp with the previously kept one are dropped,
    /// unless the later one is teleported, in which case it replaces the kept
    /// sample.
    /// With `stop_at_teleport`, everything before the most recent teleported
    /// sample is cut off and that sample becomes the first element, since
    /// positions on either side of a teleport are not spatially continuous.
    pub fn simplify(&self, stop_at_teleport: bool) -> Vec<PositionSample> {
        let mut out: Vec<PositionSample> = Vec::with_capacity(self.samples.len());
        for sample in &self.samples {
            match out.last_mut() {
                // A teleport on the same tick wins; it marks the discontinuity.
                Some(kept) if sample.timestamp <= kept.timestamp => {
                    if sample.teleported {
                        *kept = *sample;
                    }
                }
                _ => out.push(*sample),
            }
        }
        if stop_at_teleport && let Some(origin) = out.iter().rposition(|s| s.teleported) {
            out.drain(..origin);
        }
        out
    }
}

/// Timestamp to record for a sample stamped `timestamp` after one at `last`.
fn clamp_to_last(timestamp: f64, last: f64) -> f64 {
    if timestamp < last {
        warn!(timestamp, last, "clamping out-of-order position sample");
        return last;
    }
    timestamp
}

impl<'a> IntoIterator for &'a PositionHistory {
    type Item = &'a PositionSample;
    type IntoIter = std::collections::vec_deque::Iter<'a, PositionSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
