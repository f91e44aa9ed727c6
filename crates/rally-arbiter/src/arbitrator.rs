//! The `Arbitrator` — selection loop, preemption monitor, stop token.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use tracing::{debug, trace};

use rally_behavior::Behavior;
use rally_core::Signal;

use crate::{ArbiterError, ArbiterResult};

/// Sentinel for "no action in progress".
const IDLE: usize = usize::MAX;

/// Priority-based behavior scheduler.
///
/// Behaviors are supplied highest-priority-first; every selection cycle
/// re-scans from the top, so a higher-priority trigger becoming true always
/// wins on the very next cycle.  There is no tick period — selection runs
/// as fast as the underlying sensor polling allows, yielding the CPU each
/// iteration.
///
/// # Stopping
///
/// Three paths into the terminal state:
/// - [`stop`][Arbitrator::stop] (or raising any clone of the stop
///   [`Signal`]) — also how a behavior ends the loop from inside its
///   action;
/// - every trigger false with `exit_on_idle` set;
/// - never from a behavior fault: a panic inside an action unwinds through
///   [`run`][Arbitrator::run] to the owning stage, which releases the
///   stage's resources.  The arbitrator guarantees mutual exclusion of
///   actions, not fault isolation.
pub struct Arbitrator {
    behaviors:    Vec<Box<dyn Behavior>>,
    stop:         Signal,
    exit_on_idle: bool,
    /// Index of the behavior whose action is currently running.
    active:       AtomicUsize,
    /// Bumped at every action start; the monitor suppresses each action
    /// epoch at most once.
    epoch:        AtomicUsize,
    running:      AtomicBool,
}

impl Arbitrator {
    /// `behaviors` in descending priority (index 0 wins every tie by
    /// construction).  `stop` is the shared token any holder may raise;
    /// with `exit_on_idle` the loop also ends once no trigger is true.
    pub fn new(
        behaviors:    Vec<Box<dyn Behavior>>,
        stop:         Signal,
        exit_on_idle: bool,
    ) -> ArbiterResult<Self> {
        if behaviors.is_empty() {
            return Err(ArbiterError::NoBehaviors);
        }
        Ok(Self {
            behaviors,
            stop,
            exit_on_idle,
            active: AtomicUsize::new(IDLE),
            epoch: AtomicUsize::new(0),
            running: AtomicBool::new(false),
        })
    }

    /// A clone of the stop token, for behaviors that end the stage and for
    /// the owning controller.
    pub fn stop_handle(&self) -> Signal {
        self.stop.clone()
    }

    /// Request loop termination.  Idempotent; returns immediately.
    pub fn stop(&self) {
        self.stop.set();
    }

    /// `true` while [`run`][Arbitrator::run] is executing.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Drive behaviors until stopped.  Blocks the calling thread; actions
    /// run here, never on the monitor.
    pub fn run(&mut self) {
        self.running.store(true, Ordering::Release);
        let _running = ClearOnDrop(&self.running);

        let behaviors = &self.behaviors;
        let stop = &self.stop;
        let active = &self.active;
        let epoch = &self.epoch;
        let exit_on_idle = self.exit_on_idle;

        thread::scope(|scope| {
            // Raised on every exit path (including an unwinding action) so
            // the monitor can never outlive the loop.
            let _release = SetOnDrop(stop);

            scope.spawn(|| monitor(behaviors, stop, active, epoch));

            loop {
                if stop.is_set() {
                    break;
                }
                match behaviors.iter().position(|b| b.check_trigger()) {
                    None => {
                        if exit_on_idle {
                            debug!("no trigger active, exiting on idle");
                            break;
                        }
                        thread::yield_now();
                    }
                    Some(i) => {
                        trace!(behavior = behaviors[i].name(), "action start");
                        epoch.fetch_add(1, Ordering::SeqCst);
                        active.store(i, Ordering::SeqCst);
                        behaviors[i].run_action();
                        active.store(IDLE, Ordering::SeqCst);
                        trace!(behavior = behaviors[i].name(), "action done");
                    }
                }
            }
        });
    }
}

/// Preemption watcher: while an action is in progress, re-evaluate all
/// strictly higher-priority triggers and suppress the running behavior as
/// soon as one of them (or the stop token) wants control.  Quiescent while
/// the selection loop itself is scanning, so trigger calls from the two
/// threads never overlap.
fn monitor(
    behaviors: &[Box<dyn Behavior>],
    stop:      &Signal,
    active:    &AtomicUsize,
    epoch:     &AtomicUsize,
) {
    // Epoch of the action we already suppressed — suppress each one once.
    let mut notified = 0;

    loop {
        let running = active.load(Ordering::SeqCst);

        if stop.is_set() {
            if running != IDLE {
                behaviors[running].notify_preempted();
            }
            return;
        }

        if running != IDLE {
            let this_epoch = epoch.load(Ordering::SeqCst);
            if this_epoch != notified {
                let winner = behaviors[..running].iter().position(|b| b.check_trigger());
                if let Some(w) = winner {
                    debug!(
                        preempted = behaviors[running].name(),
                        winner = behaviors[w].name(),
                        "preemption"
                    );
                    behaviors[running].notify_preempted();
                    notified = this_epoch;
                }
            }
        }

        thread::yield_now();
    }
}

// ── Drop guards ───────────────────────────────────────────────────────────────

struct ClearOnDrop<'a>(&'a AtomicBool);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct SetOnDrop<'a>(&'a Signal);

impl Drop for SetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set();
    }
}
