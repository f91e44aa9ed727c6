//! The `Behavior` trait — the main extension point for stage code.

use crate::BehaviorState;

/// A reactive unit competing for actuator control.
///
/// Implement this trait to add a response the arbitrator can select.  A
/// behavior's priority is its position in the arbitrator's list (index 0 =
/// highest); the trait itself carries no rank.
///
/// # Required methods
///
/// Only [`state`][Self::state], [`check_trigger`][Self::check_trigger], and
/// [`run_action`][Self::run_action] are required; preemption and
/// termination have default impls that flip the embedded
/// [`BehaviorState`] latches.
///
/// # Contract
///
/// - `check_trigger` runs every arbitration cycle: keep it cheap, read
///   sensors through the shared handles, cause no motion.  It must return
///   `false` unconditionally once the behavior has been terminated.
/// - `run_action` clears the suppression latch on entry, polls it at safe
///   points, and when suppressed stops motion and returns promptly.  A
///   fault that escapes the action unwinds through the arbitrator to the
///   owning stage.
///
/// # Thread safety
///
/// `check_trigger` is called from the arbitrator's monitor while another
/// behavior's action runs on the stage thread, so implementations must be
/// `Send + Sync`.  Keep mutable state in [`BehaviorState`] or other
/// atomics.
pub trait Behavior: Send + Sync {
    /// The embedded suppression/termination latches.
    fn state(&self) -> &BehaviorState;

    /// Does this behavior want control right now?
    fn check_trigger(&self) -> bool;

    /// The behavior's response.  Runs on the stage thread, at most one
    /// action at a time across the whole arbitrator.
    fn run_action(&self);

    /// Diagnostic name, used in arbitration logs.
    fn name(&self) -> &str {
        self.state().name()
    }

    /// A higher-priority behavior has taken over.  The running action
    /// observes the latch and exits at its next checkpoint.
    fn notify_preempted(&self) {
        self.state().suppress();
    }

    /// Retire the behavior without interrupting an in-progress action.
    fn request_termination(&self) {
        self.state().terminate();
    }
}
