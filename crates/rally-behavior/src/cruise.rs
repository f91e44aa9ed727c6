//! `Cruise` — the lowest-priority default: drive forward until someone
//! more important takes over.

use std::thread;

use rally_hal::{lock, Drive, SharedDrive};

use crate::{Behavior, BehaviorState};

/// Always wants control (until terminated); its action starts the chassis
/// forward and then spins cooperatively, yielding each iteration, until
/// suppressed or terminated — at which point it stops motion and returns.
pub struct Cruise {
    state: BehaviorState,
    drive: SharedDrive,
    speed: f32,
}

impl Cruise {
    pub fn new(drive: SharedDrive, speed: f32) -> Self {
        Self {
            state: BehaviorState::new("cruise"),
            drive,
            speed,
        }
    }
}

impl Behavior for Cruise {
    fn state(&self) -> &BehaviorState {
        &self.state
    }

    fn check_trigger(&self) -> bool {
        !self.state.is_terminated()
    }

    fn run_action(&self) {
        self.state.rearm();

        {
            let mut drive = lock(&self.drive);
            drive.set_speed(self.speed);
            drive.forward();
        }

        while !self.state.is_suppressed() && !self.state.is_terminated() {
            thread::yield_now();
        }

        lock(&self.drive).stop();
    }
}
