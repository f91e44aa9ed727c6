//! `HardwareProvider` — the acquisition seam between the stage controller
//! and concrete hardware.
//!
//! # Pluggability
//!
//! The stage controller opens every handle through this trait, so the same
//! lifecycle code runs against the real brick and against the
//! [`mock`][crate::mock] bench rig.  Implementations must be `Send + Sync`:
//! the provider is shared by the controller (acquisition on the caller's
//! thread) and outlives individual stages.

use rally_core::{DriveGeometry, MotorPort, SensorPort};

use crate::display::SharedDisplay;
use crate::drive::SharedDrive;
use crate::motor::SharedMotor;
use crate::sensor::SharedSensor;
use crate::HalResult;

/// Factory for every hardware handle a stage can claim.
///
/// Each `open_*` call allocates a fresh exclusive handle; opening the same
/// port twice without an intervening close is an error on real hardware,
/// which is exactly what the stage resource discipline prevents.
pub trait HardwareProvider: Send + Sync {
    /// One regulated wheel motor.
    fn open_large_motor(&self, port: MotorPort) -> HalResult<SharedMotor>;

    /// The medium motor that tilts the sensor head.
    fn open_head_motor(&self, port: MotorPort) -> HalResult<SharedMotor>;

    /// Differential pilot built on an already-open motor pair.
    fn open_differential_drive(
        &self,
        left:     SharedMotor,
        right:    SharedMotor,
        geometry: &DriveGeometry,
    ) -> HalResult<SharedDrive>;

    /// Raw-power pilot that owns the wheel motors itself.
    fn open_unregulated_drive(&self, geometry: &DriveGeometry) -> HalResult<SharedDrive>;

    fn open_touch(&self, port: SensorPort) -> HalResult<SharedSensor>;

    fn open_color(&self, port: SensorPort) -> HalResult<SharedSensor>;

    fn open_distance(&self, port: SensorPort) -> HalResult<SharedSensor>;

    /// The status display.  Not a stage resource — always available and
    /// never closed by the stage lifecycle.
    fn display(&self) -> SharedDisplay;
}
