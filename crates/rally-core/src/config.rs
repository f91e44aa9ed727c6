//! Robot configuration: drive geometry and speed profile.
//!
//! Geometry defaults were measured on the competition chassis (wheel
//! ⌀ 42.75 mm, track 143.15 mm) and feed the differential and unregulated
//! pilots.  Speeds are normalized to `0.0..=1.0` of the pilot's maximum;
//! the pilot implementation maps them to motor power.

use crate::PortMap;

// ── DriveGeometry ─────────────────────────────────────────────────────────────

/// Physical wheel/chassis dimensions the pilots need for odometry.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriveGeometry {
    /// Wheel diameter in millimeters.
    pub wheel_diameter_mm: f32,
    /// Distance between the two wheel contact points, millimeters.
    pub track_width_mm: f32,
}

impl Default for DriveGeometry {
    fn default() -> Self {
        Self {
            wheel_diameter_mm: 42.75,
            track_width_mm:    143.15,
        }
    }
}

// ── DriveConfig ───────────────────────────────────────────────────────────────

/// Geometry plus the speed profile shared by stages and behaviors.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriveConfig {
    pub geometry: DriveGeometry,

    /// Normalized default travel speed for forward cruising.
    pub cruise_speed: f32,

    /// Normalized speed for escape maneuvers (backing off an obstacle).
    /// Deliberately slow so the bumper is not re-triggered on the turn.
    pub escape_speed: f32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            geometry:     DriveGeometry::default(),
            cruise_speed: 0.5,
            escape_speed: 0.2,
        }
    }
}

// ── RobotConfig ───────────────────────────────────────────────────────────────

/// Everything a stage controller needs to open and drive the hardware.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotConfig {
    pub ports: PortMap,
    pub drive: DriveConfig,
}
