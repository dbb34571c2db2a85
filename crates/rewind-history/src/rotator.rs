//! Pitch/yaw/roll orientation in degrees.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// View or facing orientation, in degrees.
///
/// Axes follow a Z-up world: yaw turns about +Z, pitch tilts the forward
/// vector towards +Z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    /// Up/down tilt in degrees.
    pub pitch: f32,
    /// Heading in degrees.
    pub yaw: f32,
    /// Bank in degrees.
    pub roll: f32,
}

impl Rotator {
    /// No rotation.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a rotator from pitch, yaw and roll in degrees.
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Returns a copy with every axis wrapped into (-180, 180].
    pub fn normalized(self) -> Self {
        Self {
            pitch: normalize_axis(self.pitch),
            yaw: normalize_axis(self.yaw),
            roll: normalize_axis(self.roll),
        }
    }

    /// Unit vector pointing along the view direction. Roll does not affect it.
    pub fn forward(self) -> Vec3 {
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        Vec3::new(cp * cy, cp * sy, sp)
    }
}

fn normalize_axis(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
