//! `BumperEscape` — back away and turn when the front bumper is hit.

use std::thread;
use std::time::Duration;

use tracing::warn;

use rally_hal::{
    lock, Drive, SampleSource, SharedDisplay, SharedDrive, SharedSensor, StatusDisplay,
    TOUCH_THRESHOLD,
};

use crate::{Behavior, BehaviorState};

/// Default back-off duration before turning away from the obstacle.
const BACK_OFF: Duration = Duration::from_millis(1000);

/// Default duration of the left turn clearing the obstacle.
const TURN: Duration = Duration::from_millis(2000);

/// Reacts to a bumper press by backing off slowly, then turning left.
///
/// The two maneuver segments are fixed-duration moves and cannot be
/// cancelled mid-delay; suppression is honored at the segment boundary
/// (after the back-off, before the turn), with motion already stopped.
pub struct BumperEscape {
    state:    BehaviorState,
    touch:    SharedSensor,
    drive:    SharedDrive,
    display:  SharedDisplay,
    speed:    f32,
    back_off: Duration,
    turn:     Duration,
}

impl BumperEscape {
    pub fn new(
        touch:   SharedSensor,
        drive:   SharedDrive,
        display: SharedDisplay,
        speed:   f32,
    ) -> Self {
        Self {
            state: BehaviorState::new("bumper-escape"),
            touch,
            drive,
            display,
            speed,
            back_off: BACK_OFF,
            turn: TURN,
        }
    }

    /// Override the maneuver durations (course tuning, fast tests).
    pub fn with_timings(mut self, back_off: Duration, turn: Duration) -> Self {
        self.back_off = back_off;
        self.turn = turn;
        self
    }
}

impl Behavior for BumperEscape {
    fn state(&self) -> &BehaviorState {
        &self.state
    }

    fn check_trigger(&self) -> bool {
        if self.state.is_terminated() {
            return false;
        }
        match lock(&self.touch).read_scalar() {
            Ok(value) => value >= TOUCH_THRESHOLD,
            Err(e) => {
                warn!(behavior = self.name(), error = %e, "trigger read failed");
                false
            }
        }
    }

    fn run_action(&self) {
        self.state.rearm();

        {
            let mut lcd = lock(&self.display);
            lcd.clear();
            lcd.draw_string("bumper...", 0, 0);
        }

        {
            let mut drive = lock(&self.drive);
            drive.set_speed(self.speed);
            drive.backward();
        }
        thread::sleep(self.back_off);
        lock(&self.drive).stop();

        // Segment boundary: motion is stopped, safe to yield here.
        if self.state.is_suppressed() {
            return;
        }

        {
            let mut drive = lock(&self.drive);
            drive.set_speed(self.speed);
            drive.rotate_left();
        }
        thread::sleep(self.turn);
        lock(&self.drive).stop();
    }
}
