//! `StageController` — declare, start, stop; one thread per stage.

use std::any::Any;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use rally_core::{ResourceFlags, RobotConfig, Signal};
use rally_hal::HardwareProvider;

use crate::context::StageContext;
use crate::resources::acquire;
use crate::solver::StageSolver;
use crate::{StageError, StageResult};

/// Poll interval of the bounded join wait.
const JOIN_POLL: Duration = Duration::from_millis(5);

/// Owns one stage's lifecycle: resource declaration, acquisition, the
/// stage thread, and abort/join semantics.
///
/// # Lifecycle rules
///
/// - [`declare_resources`][Self::declare_resources] only before
///   [`start`][Self::start]; the set is frozen once the stage has started.
/// - `start` acquires resources synchronously (the caller sees acquisition
///   failures), then spawns the stage thread.  A controller runs once —
///   a second `start` is a state error, like restarting a finished thread.
/// - [`stop`][Self::stop] is idempotent and never blocks longer than the
///   given timeout.
pub struct StageController {
    name:      String,
    provider:  Arc<dyn HardwareProvider>,
    config:    RobotConfig,
    requested: ResourceFlags,
    abort:     Signal,
    exit:      Signal,
    solver:    Option<Box<dyn StageSolver>>,
    thread:    Option<JoinHandle<StageResult<()>>>,
    started:   bool,
}

impl StageController {
    pub fn new(
        name:     impl Into<String>,
        solver:   impl StageSolver + 'static,
        provider: Arc<dyn HardwareProvider>,
        config:   RobotConfig,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            config,
            requested: ResourceFlags::NONE,
            abort: Signal::new(),
            exit: Signal::new(),
            solver: Some(Box::new(solver)),
            thread: None,
            started: false,
        }
    }

    /// Declare the capability groups this stage needs, e.g.
    /// `ResourceFlags::MOTORS | ResourceFlags::TOUCH`.
    ///
    /// The combination is validated immediately; nothing is opened until
    /// [`start`][Self::start].  Fails with a state error once the stage
    /// has been started.
    pub fn declare_resources(&mut self, flags: ResourceFlags) -> StageResult<()> {
        if self.started {
            return Err(StageError::State("resources must be declared before start()"));
        }
        flags.validate()?;
        self.requested = flags;
        Ok(())
    }

    /// Acquire the declared resources, then launch the stage thread.
    ///
    /// Acquisition happens on the calling thread: an open failure rolls
    /// back the handles opened so far and propagates here, and the stage
    /// counts as never started.
    pub fn start(&mut self) -> StageResult<()> {
        if self.started {
            return Err(StageError::State("stage already started"));
        }

        let resources = acquire(self.provider.as_ref(), self.requested, &self.config)?;

        let Some(mut solver) = self.solver.take() else {
            return Err(StageError::State("stage already started"));
        };
        self.started = true;

        let ctx = StageContext::new(
            self.name.clone(),
            resources,
            self.abort.clone(),
            self.exit.clone(),
            self.provider.display(),
            self.config,
        );

        info!(stage = %self.name, resources = %self.requested, "stage starting");

        let handle = thread::Builder::new()
            .name(format!("stage-{}", self.name))
            .spawn(move || {
                ctx.announce();
                let result = solver.solve(&ctx);
                match &result {
                    Ok(()) => info!(stage = ctx.name(), "stage completed"),
                    Err(e) => warn!(stage = ctx.name(), error = %e, "stage failed"),
                }
                // `ctx` drops here (and on any panic inside solve), which
                // releases every acquired handle exactly once.
                result
            })?;

        self.thread = Some(handle);
        Ok(())
    }

    /// Request the stage to end: raises the abort flag and the arbitrator
    /// stop token.  Idempotent.
    ///
    /// With `join_timeout`, additionally waits — bounded — for the stage
    /// thread and returns its outcome: `Err` if the solver failed or
    /// panicked, `Ok` otherwise.  A thread still running when the timeout
    /// elapses is logged and left to finish on its own; a later `stop`
    /// call can collect it.
    pub fn stop(&mut self, join_timeout: Option<Duration>) -> StageResult<()> {
        self.abort.set();
        self.exit.set();

        let Some(timeout) = join_timeout else {
            return Ok(());
        };
        let Some(handle) = self.thread.take() else {
            return Ok(());
        };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(JOIN_POLL);
        }

        if handle.is_finished() {
            match handle.join() {
                Ok(result) => result,
                Err(payload) => Err(StageError::Panicked(panic_text(payload))),
            }
        } else {
            warn!(stage = %self.name, "stage thread still running after bounded join");
            self.thread = Some(handle);
            Ok(())
        }
    }

    /// `true` while no abort has been requested and the stage thread is
    /// alive.
    pub fn is_active(&self) -> bool {
        !self.abort.is_set() && self.is_running()
    }

    /// `true` while the stage thread is alive (regardless of abort state).
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Human-readable text from a join panic payload.
fn panic_text(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
