//! The bench rig — mock hardware for tests and off-robot demos.
//!
//! `MockHardware` implements [`HardwareProvider`] with scripted sensors and
//! command-recording actuators.  Every open and close is written to a
//! ledger so lifecycle tests can assert "each acquired handle closed
//! exactly once" directly, and both open and close failures can be
//! injected to drive the rollback and best-effort-release paths.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use rally_core::{DriveGeometry, MotorPort, SensorPort};

use crate::device::{lock, Device};
use crate::display::{SharedDisplay, StatusDisplay};
use crate::drive::{Drive, SharedDrive};
use crate::motor::{Motor, SharedMotor};
use crate::provider::HardwareProvider;
use crate::sensor::{SampleSource, SharedSensor};
use crate::{HalError, HalResult};

// ── Recorded commands ─────────────────────────────────────────────────────────

/// One chassis command as seen by a mock drive.
#[derive(Clone, Debug, PartialEq)]
pub enum DriveCommand {
    SetSpeed(f32),
    Forward,
    Backward,
    RotateLeft,
    RotateRight,
    Travel(i32),
    Rotate(i32),
    Stop,
}

// ── Shared rig state ──────────────────────────────────────────────────────────

#[derive(Default)]
struct RigState {
    opened:       Mutex<Vec<String>>,
    closed:       Mutex<Vec<String>>,
    drive_log:    Mutex<Vec<DriveCommand>>,
    rotations:    Mutex<Vec<(String, i32)>>,
    display_rows: Mutex<Vec<String>>,

    touch_pressed: AtomicBool,
    color_script:  Mutex<VecDeque<f32>>,
    color_idle:    Mutex<f32>,
    distance_mm:   Mutex<f32>,

    /// Remaining successful opens before injection kicks in; -1 = unlimited.
    fail_open_after: AtomicI64,
    fail_close:      Mutex<Vec<String>>,
}

// ── MockHardware ──────────────────────────────────────────────────────────────

/// The bench rig provider.  Clone-free: share it as `Arc<MockHardware>`.
pub struct MockHardware {
    state:   Arc<RigState>,
    display: Arc<Mutex<MockDisplay>>,
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHardware {
    pub fn new() -> Self {
        let state = Arc::new(RigState {
            fail_open_after: AtomicI64::new(-1),
            ..RigState::default()
        });
        let display = Arc::new(Mutex::new(MockDisplay { state: state.clone() }));
        Self { state, display }
    }

    // ── Failure injection ─────────────────────────────────────────────────

    /// Let `n` opens succeed, then fail every subsequent open.
    pub fn fail_open_after(&self, n: usize) {
        self.state.fail_open_after.store(n as i64, Ordering::SeqCst);
    }

    /// Make closes of the named device fail (the attempt is still logged).
    pub fn fail_close_of(&self, name: &str) {
        lock(&self.state.fail_close).push(name.to_string());
    }

    // ── Sensor scripting ──────────────────────────────────────────────────

    /// Level-triggered bumper state read by the touch sensor.
    pub fn press_bumper(&self, pressed: bool) {
        self.state.touch_pressed.store(pressed, Ordering::SeqCst);
    }

    /// Queue color readings; the sensor falls back to the idle level once
    /// the script is exhausted.
    pub fn push_color(&self, values: &[f32]) {
        lock(&self.state.color_script).extend(values.iter().copied());
    }

    pub fn set_color_idle(&self, value: f32) {
        *lock(&self.state.color_idle) = value;
    }

    pub fn set_distance_mm(&self, mm: f32) {
        *lock(&self.state.distance_mm) = mm;
    }

    // ── Ledger access ─────────────────────────────────────────────────────

    pub fn opened(&self) -> Vec<String> {
        lock(&self.state.opened).clone()
    }

    pub fn closed(&self) -> Vec<String> {
        lock(&self.state.closed).clone()
    }

    /// How many times `name` has been close-attempted.
    pub fn close_count_of(&self, name: &str) -> usize {
        lock(&self.state.closed).iter().filter(|n| *n == name).count()
    }

    pub fn drive_log(&self) -> Vec<DriveCommand> {
        lock(&self.state.drive_log).clone()
    }

    pub fn rotations(&self) -> Vec<(String, i32)> {
        lock(&self.state.rotations).clone()
    }

    pub fn display_rows(&self) -> Vec<String> {
        lock(&self.state.display_rows).clone()
    }

    // ── Internal ──────────────────────────────────────────────────────────

    /// Gate an open against the injection counter, then record it.
    fn admit(&self, name: &str, port: &str) -> HalResult<()> {
        let admitted = self
            .state
            .fail_open_after
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                -1 => Some(-1),
                0 => None,
                n => Some(n - 1),
            })
            .is_ok();
        if !admitted {
            return Err(HalError::Open {
                device: name.to_string(),
                port:   port.to_string(),
                reason: "injected open failure".to_string(),
            });
        }
        lock(&self.state.opened).push(name.to_string());
        Ok(())
    }
}

impl HardwareProvider for MockHardware {
    fn open_large_motor(&self, port: MotorPort) -> HalResult<SharedMotor> {
        let name = format!("large-motor({port})");
        self.admit(&name, &port.to_string())?;
        Ok(Arc::new(Mutex::new(MockMotor { name, state: self.state.clone() })))
    }

    fn open_head_motor(&self, port: MotorPort) -> HalResult<SharedMotor> {
        let name = format!("head-motor({port})");
        self.admit(&name, &port.to_string())?;
        Ok(Arc::new(Mutex::new(MockMotor { name, state: self.state.clone() })))
    }

    fn open_differential_drive(
        &self,
        _left:     SharedMotor,
        _right:    SharedMotor,
        _geometry: &DriveGeometry,
    ) -> HalResult<SharedDrive> {
        let name = "diff-pilot".to_string();
        self.admit(&name, "-")?;
        Ok(Arc::new(Mutex::new(MockDrive { name, state: self.state.clone() })))
    }

    fn open_unregulated_drive(&self, _geometry: &DriveGeometry) -> HalResult<SharedDrive> {
        let name = "unreg-pilot".to_string();
        self.admit(&name, "-")?;
        Ok(Arc::new(Mutex::new(MockDrive { name, state: self.state.clone() })))
    }

    fn open_touch(&self, port: SensorPort) -> HalResult<SharedSensor> {
        let name = format!("touch({port})");
        self.admit(&name, &port.to_string())?;
        Ok(Arc::new(Mutex::new(MockSensor {
            name,
            kind: SensorKind::Touch,
            state: self.state.clone(),
        })))
    }

    fn open_color(&self, port: SensorPort) -> HalResult<SharedSensor> {
        let name = format!("color({port})");
        self.admit(&name, &port.to_string())?;
        Ok(Arc::new(Mutex::new(MockSensor {
            name,
            kind: SensorKind::Color,
            state: self.state.clone(),
        })))
    }

    fn open_distance(&self, port: SensorPort) -> HalResult<SharedSensor> {
        let name = format!("distance({port})");
        self.admit(&name, &port.to_string())?;
        Ok(Arc::new(Mutex::new(MockSensor {
            name,
            kind: SensorKind::Distance,
            state: self.state.clone(),
        })))
    }

    fn display(&self) -> SharedDisplay {
        self.display.clone()
    }
}

// ── Mock devices ──────────────────────────────────────────────────────────────

fn record_close(state: &RigState, name: &str) -> HalResult<()> {
    lock(&state.closed).push(name.to_string());
    if lock(&state.fail_close).iter().any(|n| n == name) {
        return Err(HalError::Close {
            device: name.to_string(),
            reason: "injected close failure".to_string(),
        });
    }
    Ok(())
}

struct MockMotor {
    name:  String,
    state: Arc<RigState>,
}

impl Device for MockMotor {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&mut self) -> HalResult<()> {
        record_close(&self.state, &self.name)
    }
}

impl Motor for MockMotor {
    fn set_speed(&mut self, _speed: f32) {}

    fn forward(&mut self) {}

    fn backward(&mut self) {}

    fn rotate(&mut self, degrees: i32) {
        lock(&self.state.rotations).push((self.name.clone(), degrees));
    }

    fn stop(&mut self) {}
}

struct MockDrive {
    name:  String,
    state: Arc<RigState>,
}

impl MockDrive {
    fn log(&self, cmd: DriveCommand) {
        lock(&self.state.drive_log).push(cmd);
    }
}

impl Device for MockDrive {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&mut self) -> HalResult<()> {
        record_close(&self.state, &self.name)
    }
}

impl Drive for MockDrive {
    fn set_speed(&mut self, speed: f32) {
        self.log(DriveCommand::SetSpeed(speed));
    }

    fn forward(&mut self) {
        self.log(DriveCommand::Forward);
    }

    fn backward(&mut self) {
        self.log(DriveCommand::Backward);
    }

    fn rotate_left(&mut self) {
        self.log(DriveCommand::RotateLeft);
    }

    fn rotate_right(&mut self) {
        self.log(DriveCommand::RotateRight);
    }

    fn travel(&mut self, distance_mm: i32) {
        self.log(DriveCommand::Travel(distance_mm));
    }

    fn rotate(&mut self, degrees: i32) {
        self.log(DriveCommand::Rotate(degrees));
    }

    fn stop(&mut self) {
        self.log(DriveCommand::Stop);
    }
}

enum SensorKind {
    Touch,
    Color,
    Distance,
}

struct MockSensor {
    name:  String,
    kind:  SensorKind,
    state: Arc<RigState>,
}

impl Device for MockSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(&mut self) -> HalResult<()> {
        record_close(&self.state, &self.name)
    }
}

impl SampleSource for MockSensor {
    fn sample_size(&self) -> usize {
        1
    }

    fn fetch_sample(&mut self, buf: &mut [f32], offset: usize) -> HalResult<()> {
        buf[offset] = match self.kind {
            SensorKind::Touch => {
                if self.state.touch_pressed.load(Ordering::SeqCst) {
                    1.0
                } else {
                    0.0
                }
            }
            SensorKind::Color => lock(&self.state.color_script)
                .pop_front()
                .unwrap_or(*lock(&self.state.color_idle)),
            SensorKind::Distance => *lock(&self.state.distance_mm),
        };
        Ok(())
    }
}

struct MockDisplay {
    state: Arc<RigState>,
}

impl StatusDisplay for MockDisplay {
    fn clear(&mut self) {
        lock(&self.state.display_rows).push("<clear>".to_string());
    }

    fn clear_row(&mut self, row: u8) {
        lock(&self.state.display_rows).push(format!("<clear row {row}>"));
    }

    fn draw_string(&mut self, text: &str, x: u8, y: u8) {
        lock(&self.state.display_rows).push(format!("{x},{y}:{text}"));
    }
}
