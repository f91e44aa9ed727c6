//! The `Motor` trait — one regulated motor.

use crate::device::{Device, Shared};

/// A single regulated motor (wheel or sensor head).
///
/// Directional commands are fire-and-forget; [`rotate`][Motor::rotate] is
/// the one blocking primitive (it returns when the target angle is reached).
pub trait Motor: Device {
    /// Normalized speed in `0.0..=1.0` of the motor's maximum.
    fn set_speed(&mut self, speed: f32);

    fn forward(&mut self);

    fn backward(&mut self);

    /// Rotate by `degrees` (negative = opposite direction), blocking until
    /// the motion completes.
    fn rotate(&mut self, degrees: i32);

    fn stop(&mut self);
}

pub type SharedMotor = Shared<dyn Motor>;
