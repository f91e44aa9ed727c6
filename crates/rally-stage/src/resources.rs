//! Resource acquisition and the release-on-drop guard.
//!
//! Hardware handles are opened in a fixed order — the motor pair first,
//! because the differential pilot is built on top of it and opens the pair
//! itself when the stage declared `DIFF_PILOT` alone.  If any single open
//! fails, the partially built [`AcquiredResources`] is dropped on the spot,
//! which closes everything opened so far before the error propagates.

use std::sync::{Arc, Mutex};

use tracing::warn;

use rally_core::{Capability, ResourceFlags, RobotConfig};
use rally_hal::{
    lock, Device, HardwareProvider, SharedDrive, SharedMotor, SharedSensor,
};

use crate::{StageError, StageResult};

// ── AcquiredResources ─────────────────────────────────────────────────────────

/// The hardware handles one stage exclusively owns.
///
/// Dropping this releases every handle exactly once (each slot is
/// `Option::take`n), best-effort: a close failure is logged at `warn` and
/// the remaining handles are still attempted.
pub struct AcquiredResources {
    flags:       ResourceFlags,
    motor_left:  Option<SharedMotor>,
    motor_right: Option<SharedMotor>,
    drive:       Option<SharedDrive>,
    color:       Option<SharedSensor>,
    distance:    Option<SharedSensor>,
    touch:       Option<SharedSensor>,
    head:        Option<SharedMotor>,
}

impl AcquiredResources {
    fn empty(flags: ResourceFlags) -> Self {
        Self {
            flags,
            motor_left:  None,
            motor_right: None,
            drive:       None,
            color:       None,
            distance:    None,
            touch:       None,
            head:        None,
        }
    }

    /// The capability set this stage declared.
    pub fn flags(&self) -> ResourceFlags {
        self.flags
    }

    // ── Typed accessors ───────────────────────────────────────────────────
    //
    // Each accessor hands out a clone of the shared handle, gated on the
    // *declared* flags — a motor pair opened only as a side effect of the
    // differential pilot stays internal to the pilot.

    pub fn motor_left(&self) -> StageResult<SharedMotor> {
        self.motor(&self.motor_left)
    }

    pub fn motor_right(&self) -> StageResult<SharedMotor> {
        self.motor(&self.motor_right)
    }

    fn motor(&self, slot: &Option<SharedMotor>) -> StageResult<SharedMotor> {
        if !self.flags.has(Capability::MotorPair) {
            return Err(StageError::MissingResource(Capability::MotorPair));
        }
        slot.clone().ok_or(StageError::MissingResource(Capability::MotorPair))
    }

    /// The pilot — differential or unregulated, whichever was declared.
    pub fn drive(&self) -> StageResult<SharedDrive> {
        self.drive.clone().ok_or(StageError::NoPilotDeclared)
    }

    pub fn color(&self) -> StageResult<SharedSensor> {
        self.sensor(&self.color, Capability::Color)
    }

    pub fn distance(&self) -> StageResult<SharedSensor> {
        self.sensor(&self.distance, Capability::Distance)
    }

    pub fn touch(&self) -> StageResult<SharedSensor> {
        self.sensor(&self.touch, Capability::Touch)
    }

    fn sensor(&self, slot: &Option<SharedSensor>, cap: Capability) -> StageResult<SharedSensor> {
        slot.clone().ok_or(StageError::MissingResource(cap))
    }

    pub fn head(&self) -> StageResult<SharedMotor> {
        self.head.clone().ok_or(StageError::MissingResource(Capability::Head))
    }

    // ── Release ───────────────────────────────────────────────────────────

    /// Close every remaining handle, in acquisition order.
    fn close_all(&mut self) {
        close_slot(&mut self.motor_left);
        close_slot(&mut self.motor_right);
        close_slot(&mut self.drive);
        close_slot(&mut self.color);
        close_slot(&mut self.distance);
        close_slot(&mut self.touch);
        close_slot(&mut self.head);
    }
}

impl Drop for AcquiredResources {
    fn drop(&mut self) {
        self.close_all();
    }
}

/// Best-effort close of one slot.  Failures are logged and swallowed so the
/// remaining handles still get their attempt.
fn close_slot<T: Device + ?Sized>(slot: &mut Option<Arc<Mutex<T>>>) {
    if let Some(handle) = slot.take() {
        let mut device = lock(&handle);
        if let Err(e) = device.close() {
            warn!(device = device.name(), error = %e, "release failed");
        }
    }
}

// ── acquire ───────────────────────────────────────────────────────────────────

/// Validate `flags` and open every declared handle through `provider`.
///
/// Fixed order: motor pair, differential pilot, unregulated pilot, color,
/// distance, touch, head.  On a partial failure every handle opened so far
/// is closed before the error propagates (rollback via the drop guard).
pub fn acquire(
    provider: &dyn HardwareProvider,
    flags:    ResourceFlags,
    config:   &RobotConfig,
) -> StageResult<AcquiredResources> {
    flags.validate()?;

    let ports = &config.ports;
    let mut res = AcquiredResources::empty(flags);

    // The differential pilot needs the motor pair; open it for either flag.
    if flags.has(Capability::MotorPair) || flags.has(Capability::DiffPilot) {
        res.motor_left = Some(provider.open_large_motor(ports.left_motor)?);
        res.motor_right = Some(provider.open_large_motor(ports.right_motor)?);
    }

    if flags.has(Capability::DiffPilot) {
        if let (Some(left), Some(right)) = (&res.motor_left, &res.motor_right) {
            res.drive = Some(provider.open_differential_drive(
                left.clone(),
                right.clone(),
                &config.drive.geometry,
            )?);
        }
    }

    if flags.has(Capability::UnregPilot) {
        res.drive = Some(provider.open_unregulated_drive(&config.drive.geometry)?);
    }

    if flags.has(Capability::Color) {
        res.color = Some(provider.open_color(ports.color)?);
    }

    if flags.has(Capability::Distance) {
        res.distance = Some(provider.open_distance(ports.distance)?);
    }

    if flags.has(Capability::Touch) {
        res.touch = Some(provider.open_touch(ports.touch)?);
    }

    if flags.has(Capability::Head) {
        res.head = Some(provider.open_head_motor(ports.head_motor)?);
    }

    Ok(res)
}
