//! The `Drive` trait — pilot-style chassis control.
//!
//! Covers both the regulated differential pilot and the raw-power
//! unregulated pilot; which one a stage gets is decided by its resource
//! flags.  Directional commands are fire-and-forget — callers bound motion
//! with explicit `stop` calls and fixed delays.  `travel`/`rotate` are the
//! blocking odometry primitives.

use crate::device::{Device, Shared};

/// Chassis-level motion.  Implementations own (or borrow) both wheel motors.
pub trait Drive: Device {
    /// Normalized speed in `0.0..=1.0`, applied to subsequent commands.
    fn set_speed(&mut self, speed: f32);

    fn forward(&mut self);

    fn backward(&mut self);

    /// Spin in place, counter-clockwise.
    fn rotate_left(&mut self);

    /// Spin in place, clockwise.
    fn rotate_right(&mut self);

    /// Drive a straight `distance_mm` (negative = backward), blocking.
    fn travel(&mut self, distance_mm: i32);

    /// Turn in place by `degrees` (negative = clockwise), blocking.
    fn rotate(&mut self, degrees: i32);

    /// Halt all motion.  Safe to call redundantly.
    fn stop(&mut self);
}

pub type SharedDrive = Shared<dyn Drive>;
