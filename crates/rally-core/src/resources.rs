//! Hardware capability groups and the `ResourceFlags` bitset.
//!
//! A stage declares the capability groups it needs as a `ResourceFlags`
//! value before its thread starts.  The combination is validated up front:
//! a stage that holds the unregulated pilot must not also hold the raw
//! motor pair or the differential pilot, because all three drive the same
//! two wheel motors.  `MOTORS | DIFF_PILOT` is permitted — the differential
//! pilot is built on top of the regulated pair.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::{CoreError, CoreResult};

// ── Capability ────────────────────────────────────────────────────────────────

/// One hardware capability group a stage can claim exclusively.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Capability {
    /// The regulated left/right wheel motor pair.
    MotorPair,
    /// Differential-drive pilot (built on the regulated motor pair).
    DiffPilot,
    /// Unregulated power pilot.  Owns the wheel motors outright.
    UnregPilot,
    /// Front touch sensor (bumper).
    Touch,
    /// Color / light sensor.
    Color,
    /// Ultrasonic distance sensor.
    Distance,
    /// Sensor-head motor (raised for the labyrinth, lowered for the bridge).
    Head,
}

impl Capability {
    /// Every capability, in acquisition order.
    pub const ALL: [Capability; 7] = [
        Capability::MotorPair,
        Capability::DiffPilot,
        Capability::UnregPilot,
        Capability::Color,
        Capability::Distance,
        Capability::Touch,
        Capability::Head,
    ];

    /// Stable lower-case label, used in logs and the course-plan CSV.
    pub fn label(self) -> &'static str {
        match self {
            Capability::MotorPair  => "motors",
            Capability::DiffPilot  => "diff-pilot",
            Capability::UnregPilot => "unreg-pilot",
            Capability::Touch      => "touch",
            Capability::Color      => "color",
            Capability::Distance   => "distance",
            Capability::Head       => "head",
        }
    }

    /// The single-bit `ResourceFlags` value for this capability.
    pub fn flag(self) -> ResourceFlags {
        ResourceFlags(match self {
            Capability::MotorPair  => 1 << 0,
            Capability::DiffPilot  => 1 << 1,
            Capability::UnregPilot => 1 << 2,
            Capability::Touch      => 1 << 3,
            Capability::Color      => 1 << 4,
            Capability::Distance   => 1 << 5,
            Capability::Head       => 1 << 6,
        })
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── ResourceFlags ─────────────────────────────────────────────────────────────

/// Bitset over [`Capability`] groups.
///
/// Build with `|`: `ResourceFlags::MOTORS | ResourceFlags::TOUCH`.
/// Set once before the owning stage thread starts; immutable afterward for
/// that stage's lifetime.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct ResourceFlags(u8);

impl ResourceFlags {
    pub const NONE:        ResourceFlags = ResourceFlags(0);
    pub const MOTORS:      ResourceFlags = ResourceFlags(1 << 0);
    pub const DIFF_PILOT:  ResourceFlags = ResourceFlags(1 << 1);
    pub const UNREG_PILOT: ResourceFlags = ResourceFlags(1 << 2);
    pub const TOUCH:       ResourceFlags = ResourceFlags(1 << 3);
    pub const COLOR:       ResourceFlags = ResourceFlags(1 << 4);
    pub const DISTANCE:    ResourceFlags = ResourceFlags(1 << 5);
    pub const HEAD:        ResourceFlags = ResourceFlags(1 << 6);

    /// `true` if every bit of `other` is set in `self`.
    pub fn contains(self, other: ResourceFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if the given capability group is claimed.
    pub fn has(self, cap: Capability) -> bool {
        self.contains(cap.flag())
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the claimed capabilities in acquisition order.
    pub fn capabilities(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.has(*c))
    }

    /// Reject combinations that would double-own the wheel motors.
    ///
    /// Must be called before any hardware handle is opened.  The permitted
    /// and rejected pairs:
    ///
    /// | Combination                 | Verdict  |
    /// |-----------------------------|----------|
    /// | `MOTORS \| DIFF_PILOT`      | ok       |
    /// | `MOTORS \| UNREG_PILOT`     | conflict |
    /// | `DIFF_PILOT \| UNREG_PILOT` | conflict |
    pub fn validate(self) -> CoreResult<()> {
        if self.has(Capability::MotorPair) && self.has(Capability::UnregPilot) {
            return Err(CoreError::Conflict(
                Capability::MotorPair,
                Capability::UnregPilot,
            ));
        }
        if self.has(Capability::DiffPilot) && self.has(Capability::UnregPilot) {
            return Err(CoreError::Conflict(
                Capability::DiffPilot,
                Capability::UnregPilot,
            ));
        }
        Ok(())
    }
}

impl BitOr for ResourceFlags {
    type Output = ResourceFlags;
    fn bitor(self, rhs: ResourceFlags) -> ResourceFlags {
        ResourceFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ResourceFlags {
    fn bitor_assign(&mut self, rhs: ResourceFlags) {
        self.0 |= rhs.0;
    }
}

impl From<Capability> for ResourceFlags {
    fn from(cap: Capability) -> ResourceFlags {
        cap.flag()
    }
}

impl fmt::Debug for ResourceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.capabilities().map(Capability::label).collect();
        write!(f, "ResourceFlags({})", labels.join("|"))
    }
}

impl fmt::Display for ResourceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let labels: Vec<&str> = self.capabilities().map(Capability::label).collect();
        f.write_str(&labels.join("|"))
    }
}
