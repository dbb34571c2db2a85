//! Visual smoothing of authoritative corrections on remote entities.
//!
//! The logical position snaps to the corrected value immediately; the
//! rendered position is offset by a visual offset that decays
//! exponentially each frame, so small corrections do not read as pops.

use glam::Vec3;
use rewind_config::PredictionConfig;

/// Offset magnitude (world units) below which the offset snaps to zero.
const MIN_OFFSET_MAGNITUDE: f32 = 0.01;

/// Decaying render-space offset between where an entity was drawn and its
/// corrected logical position.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionSmoothing {
    visual_offset: Vec3,
    /// Exponential decay rate per second.
    pub decay_rate: f32,
    /// Corrections at least this long snap instantly.
    pub snap_distance: f32,
}

impl Default for CorrectionSmoothing {
    fn default() -> Self {
        Self::from_config(&PredictionConfig::default())
    }
}

impl CorrectionSmoothing {
    /// Creates a smoothing state with the given decay rate and snap distance.
    pub fn new(decay_rate: f32, snap_distance: f32) -> Self {
        Self {
            visual_offset: Vec3::ZERO,
            decay_rate,
            snap_distance,
        }
    }

    /// Creates a smoothing state from the prediction settings.
    pub fn from_config(config: &PredictionConfig) -> Self {
        Self::new(config.smoothing_decay_rate, config.smoothing_snap_distance)
    }

    /// Records a correction of `delta` (new logical position minus old).
    ///
    /// Small corrections accumulate an offset pointing back at where the
    /// entity was drawn; large ones zero the offset so the entity snaps.
    pub fn apply_correction(&mut self, delta: Vec3) {
        if delta.length_squared() < self.snap_distance * self.snap_distance {
            self.visual_offset -= delta;
        } else {
            self.visual_offset = Vec3::ZERO;
        }
    }

    /// Decays the visual offset over `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.visual_offset *= (-self.decay_rate * dt).exp();
        if self.visual_offset.length_squared() < MIN_OFFSET_MAGNITUDE * MIN_OFFSET_MAGNITUDE {
            self.visual_offset = Vec3::ZERO;
        }
    }

    /// Offset to add to the logical position when rendering.
    pub fn visual_offset(&self) -> Vec3 {
        self.visual_offset
    }

    /// Returns `true` if the visual offset is effectively zero.
    pub fn is_zero(&self) -> bool {
        self.visual_offset == Vec3::ZERO
    }
}
