//! `BehaviorState` — the two cross-thread latches every behavior carries.

use std::sync::atomic::{AtomicBool, Ordering};

/// Suppression and termination flags, embedded by each concrete behavior.
///
/// - **suppressed** — set by the arbitrator's monitor when a higher-priority
///   behavior takes over; cleared by the action on entry ([`rearm`]).  The
///   running action polls it at safe points and returns promptly once set.
/// - **terminated** — set once via [`terminate`]; never cleared.  A
///   terminated behavior's trigger must report `false` from then on, without
///   interrupting an action already in progress.
///
/// [`rearm`]: BehaviorState::rearm
/// [`terminate`]: BehaviorState::terminate
pub struct BehaviorState {
    name:       String,
    suppressed: AtomicBool,
    terminated: AtomicBool,
}

impl BehaviorState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:       name.into(),
            suppressed: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the running action to yield control.
    pub fn suppress(&self) {
        self.suppressed.store(true, Ordering::Release);
    }

    /// Clear the suppression latch.  Called by actions on entry.
    pub fn rearm(&self) {
        self.suppressed.store(false, Ordering::Release);
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::Acquire)
    }

    /// Retire the behavior: future trigger checks report `false`.
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::Release);
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }
}
