//! `StageContext` — everything a running stage sees: its resources, the
//! abort flag, the display, and cooperative wait helpers.

use std::thread;

use rally_core::{RobotConfig, Signal};
use rally_hal::{
    lock, Motor, SampleSource, SharedDisplay, SharedDrive, SharedMotor, SharedSensor,
    StatusDisplay, TOUCH_THRESHOLD,
};

use crate::resources::AcquiredResources;
use crate::StageResult;

/// Head tilt for the labyrinth (sensor raised).
const HEAD_UP_DEG: i32 = -90;

/// Head tilt for the bridge (sensor lowered).
const HEAD_DOWN_DEG: i32 = 90;

/// Handed to [`StageSolver::solve`][crate::StageSolver::solve] on the stage
/// thread.  Owns the acquired hardware: when the context drops — normal
/// return, error, or panic — every handle is released exactly once.
pub struct StageContext {
    name:      String,
    resources: AcquiredResources,
    abort:     Signal,
    exit:      Signal,
    display:   SharedDisplay,
    config:    RobotConfig,
}

impl StageContext {
    pub(crate) fn new(
        name:      String,
        resources: AcquiredResources,
        abort:     Signal,
        exit:      Signal,
        display:   SharedDisplay,
        config:    RobotConfig,
    ) -> Self {
        Self {
            name,
            resources,
            abort,
            exit,
            display,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    pub fn display(&self) -> SharedDisplay {
        self.display.clone()
    }

    /// The stop token for this stage's arbitrator, pre-wired so the
    /// controller's `stop()` reaches the arbitration loop.  Pass it to
    /// `Arbitrator::new` and to behaviors that end the stage.
    pub fn exit_signal(&self) -> Signal {
        self.exit.clone()
    }

    /// `true` until the controller requests an abort.  Every polling loop
    /// in stage code must check this each iteration.
    pub fn active(&self) -> bool {
        !self.abort.is_set()
    }

    // ── Resource accessors ────────────────────────────────────────────────

    pub fn drive(&self) -> StageResult<SharedDrive> {
        self.resources.drive()
    }

    pub fn motor_left(&self) -> StageResult<SharedMotor> {
        self.resources.motor_left()
    }

    pub fn motor_right(&self) -> StageResult<SharedMotor> {
        self.resources.motor_right()
    }

    pub fn touch(&self) -> StageResult<SharedSensor> {
        self.resources.touch()
    }

    pub fn color(&self) -> StageResult<SharedSensor> {
        self.resources.color()
    }

    pub fn distance(&self) -> StageResult<SharedSensor> {
        self.resources.distance()
    }

    pub fn head(&self) -> StageResult<SharedMotor> {
        self.resources.head()
    }

    // ── Cooperative waits & maneuvers ─────────────────────────────────────

    /// Spin until the front bumper registers a touch.
    ///
    /// Yields each iteration so an abort is observed with bounded latency.
    /// Returns `Ok(true)` on touch, `Ok(false)` when aborted first.
    pub fn wait_for_touch(&self) -> StageResult<bool> {
        let touch = self.resources.touch()?;
        while self.active() {
            let value = lock(&touch).read_scalar()?;
            if value >= TOUCH_THRESHOLD {
                return Ok(true);
            }
            thread::yield_now();
        }
        Ok(false)
    }

    /// Raise the sensor head (labyrinth configuration).
    pub fn head_up(&self) -> StageResult<()> {
        let head = self.resources.head()?;
        lock(&head).rotate(HEAD_UP_DEG);
        Ok(())
    }

    /// Lower the sensor head (bridge configuration).
    pub fn head_down(&self) -> StageResult<()> {
        let head = self.resources.head()?;
        lock(&head).rotate(HEAD_DOWN_DEG);
        Ok(())
    }

    /// Put the stage name on the status row.
    pub(crate) fn announce(&self) {
        let mut lcd = lock(&self.display);
        lcd.clear_row(0);
        lcd.draw_string(&self.name, 0, 0);
    }
}
