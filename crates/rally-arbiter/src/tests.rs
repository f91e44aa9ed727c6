//! Unit tests for rally-arbiter.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rally_behavior::{Behavior, BehaviorState};
use rally_core::Signal;

use crate::{Arbitrator, ArbiterError};

// ── Test behaviors ────────────────────────────────────────────────────────────

type Events = Arc<Mutex<Vec<String>>>;

fn record(events: &Events, entry: &str) {
    events.lock().unwrap().push(entry.to_string());
}

/// Trigger driven by an external flag; action logs its name and raises the
/// stop token.
struct OneShot {
    state:     BehaviorState,
    triggered: Arc<AtomicBool>,
    events:    Events,
    stop:      Signal,
}

impl OneShot {
    fn new(name: &str, triggered: Arc<AtomicBool>, events: Events, stop: Signal) -> Self {
        Self {
            state: BehaviorState::new(name),
            triggered,
            events,
            stop,
        }
    }
}

impl Behavior for OneShot {
    fn state(&self) -> &BehaviorState {
        &self.state
    }

    fn check_trigger(&self) -> bool {
        !self.state.is_terminated() && self.triggered.load(Ordering::SeqCst)
    }

    fn run_action(&self) {
        self.state.rearm();
        record(&self.events, &format!("{}:start", self.state.name()));
        self.stop.set();
    }
}

/// Runs a fixed number of times, then retires itself.
struct Pulse {
    state:     BehaviorState,
    remaining: AtomicUsize,
    runs:      Arc<AtomicUsize>,
}

impl Pulse {
    fn new(count: usize, runs: Arc<AtomicUsize>) -> Self {
        Self {
            state:     BehaviorState::new("pulse"),
            remaining: AtomicUsize::new(count),
            runs,
        }
    }
}

impl Behavior for Pulse {
    fn state(&self) -> &BehaviorState {
        &self.state
    }

    fn check_trigger(&self) -> bool {
        !self.state.is_terminated()
    }

    fn run_action(&self) {
        self.state.rearm();
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.request_termination();
        }
    }
}

/// Low-priority action that spins until suppressed, flagging that it
/// started so a higher-priority trigger can key off it.
struct Spinner {
    state:   BehaviorState,
    started: Arc<AtomicBool>,
    events:  Events,
}

impl Spinner {
    fn new(started: Arc<AtomicBool>, events: Events) -> Self {
        Self {
            state: BehaviorState::new("spinner"),
            started,
            events,
        }
    }
}

impl Behavior for Spinner {
    fn state(&self) -> &BehaviorState {
        &self.state
    }

    fn check_trigger(&self) -> bool {
        !self.state.is_terminated()
    }

    fn run_action(&self) {
        self.state.rearm();
        record(&self.events, "spinner:start");
        self.started.store(true, Ordering::SeqCst);

        // Deadline guard so a missed suppression fails the test instead of
        // hanging it.
        let deadline = Instant::now() + Duration::from_secs(5);
        while !self.state.is_suppressed() {
            if Instant::now() > deadline {
                record(&self.events, "spinner:deadline");
                return;
            }
            thread::yield_now();
        }
        record(&self.events, "spinner:suppressed");
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod construction {
    use super::*;

    #[test]
    fn empty_behavior_list_rejected() {
        let result = Arbitrator::new(vec![], Signal::new(), false);
        assert!(matches!(result, Err(ArbiterError::NoBehaviors)));
    }

    #[test]
    fn stop_handle_shares_the_token() {
        let runs = Arc::new(AtomicUsize::new(0));
        let arby = Arbitrator::new(
            vec![Box::new(Pulse::new(1, runs))],
            Signal::new(),
            true,
        )
        .unwrap();
        let handle = arby.stop_handle();
        arby.stop();
        assert!(handle.is_set());
    }
}

// ── Run loop ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_loop {
    use super::*;

    #[test]
    fn action_repeats_until_termination_then_idle_exit() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut arby = Arbitrator::new(
            vec![Box::new(Pulse::new(3, runs.clone()))],
            Signal::new(),
            true,
        )
        .unwrap();

        arby.run();

        // Ran exactly three times; the fourth trigger check returned false
        // and the loop reached its terminal state.
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert!(!arby.is_running());
    }

    #[test]
    fn exit_on_idle_with_no_true_trigger() {
        let events: Events = Arc::new(Mutex::new(vec![]));
        let never = Arc::new(AtomicBool::new(false));
        let mut arby = Arbitrator::new(
            vec![Box::new(OneShot::new(
                "never",
                never,
                events.clone(),
                Signal::new(),
            ))],
            Signal::new(),
            true,
        )
        .unwrap();

        arby.run();
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn pre_set_stop_token_prevents_any_action() {
        let events: Events = Arc::new(Mutex::new(vec![]));
        let always = Arc::new(AtomicBool::new(true));
        let stop = Signal::new();
        stop.set();

        let mut arby = Arbitrator::new(
            vec![Box::new(OneShot::new(
                "eager",
                always,
                events.clone(),
                stop.clone(),
            ))],
            stop,
            false,
        )
        .unwrap();

        arby.run();
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn stop_is_idempotent() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut arby = Arbitrator::new(
            vec![Box::new(Pulse::new(1, runs))],
            Signal::new(),
            true,
        )
        .unwrap();

        arby.stop();
        arby.stop();
        assert!(arby.stop_handle().is_set());
        arby.run(); // returns immediately, no error
        assert!(!arby.is_running());
    }
}

// ── Priority & preemption ─────────────────────────────────────────────────────

#[cfg(test)]
mod priority {
    use super::*;

    #[test]
    fn highest_true_trigger_wins() {
        // Triggers: [false, true, true] → index 1 must be selected.
        let events: Events = Arc::new(Mutex::new(vec![]));
        let stop = Signal::new();

        let off = Arc::new(AtomicBool::new(false));
        let on = Arc::new(AtomicBool::new(true));

        let behaviors: Vec<Box<dyn Behavior>> = vec![
            Box::new(OneShot::new("a", off, events.clone(), stop.clone())),
            Box::new(OneShot::new("b", on.clone(), events.clone(), stop.clone())),
            Box::new(OneShot::new("c", on, events.clone(), stop.clone())),
        ];

        let mut arby = Arbitrator::new(behaviors, stop, false).unwrap();
        arby.run();

        assert_eq!(events.lock().unwrap().first().map(String::as_str), Some("b:start"));
    }

    #[test]
    fn running_action_is_preempted_by_higher_priority() {
        let events: Events = Arc::new(Mutex::new(vec![]));
        let stop = Signal::new();
        let spinner_started = Arc::new(AtomicBool::new(false));

        // Index 0 triggers only after the spinner's action has begun, so the
        // spinner is guaranteed to be mid-action when the preemption fires.
        let behaviors: Vec<Box<dyn Behavior>> = vec![
            Box::new(OneShot::new(
                "interrupt",
                spinner_started.clone(),
                events.clone(),
                stop.clone(),
            )),
            Box::new(Spinner::new(spinner_started, events.clone())),
        ];

        let mut arby = Arbitrator::new(behaviors, stop, false).unwrap();
        arby.run();

        let log = events.lock().unwrap().clone();
        assert_eq!(
            log,
            vec![
                "spinner:start".to_string(),
                "spinner:suppressed".to_string(),
                "interrupt:start".to_string(),
            ]
        );
    }

    #[test]
    fn external_stop_suppresses_the_running_action() {
        let events: Events = Arc::new(Mutex::new(vec![]));
        let stop = Signal::new();
        let started = Arc::new(AtomicBool::new(false));

        let behaviors: Vec<Box<dyn Behavior>> =
            vec![Box::new(Spinner::new(started.clone(), events.clone()))];
        let mut arby = Arbitrator::new(behaviors, stop.clone(), false).unwrap();

        let stopper = thread::spawn(move || {
            while !started.load(Ordering::SeqCst) {
                thread::yield_now();
            }
            stop.set();
        });

        arby.run();
        stopper.join().unwrap();

        let log = events.lock().unwrap().clone();
        assert_eq!(
            log,
            vec!["spinner:start".to_string(), "spinner:suppressed".to_string()]
        );
    }
}
