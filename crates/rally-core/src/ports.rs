//! Brick port identifiers and the per-robot port assignment map.

use std::fmt;

/// One of the four motor output ports on the brick.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotorPort {
    A,
    B,
    C,
    D,
}

impl fmt::Display for MotorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One of the four sensor input ports on the brick.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorPort {
    S1,
    S2,
    S3,
    S4,
}

impl fmt::Display for SensorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Which physical port each hardware handle is opened on.
///
/// The defaults match the competition robot's wiring; deployments with a
/// different loom override individual fields (or deserialize the whole map
/// from a config file with the `serde` feature).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortMap {
    pub left_motor:  MotorPort,
    pub right_motor: MotorPort,
    pub head_motor:  MotorPort,
    pub color:       SensorPort,
    pub distance:    SensorPort,
    pub touch:       SensorPort,
}

impl Default for PortMap {
    fn default() -> Self {
        Self {
            left_motor:  MotorPort::B,
            right_motor: MotorPort::A,
            head_motor:  MotorPort::C,
            color:       SensorPort::S1,
            distance:    SensorPort::S2,
            touch:       SensorPort::S3,
        }
    }
}
