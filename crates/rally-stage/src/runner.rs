//! `CourseRunner` — run the course's stages back to back.
//!
//! Only one stage is active at a time, which is what makes the
//! application-level exclusive-ownership discipline for hardware handles
//! sound: the next stage's resources are acquired only after the previous
//! stage's context has released everything.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use rally_core::RobotConfig;
use rally_hal::HardwareProvider;

use crate::controller::StageController;
use crate::loader::StagePlan;
use crate::solver::StageSolver;
use crate::StageResult;

/// How long `stop` may wait for a stage thread before giving up on it.
const STOP_JOIN: Duration = Duration::from_secs(5);

/// Poll interval while waiting for a stage to finish on its own.
const POLL: Duration = Duration::from_millis(10);

/// Sequential course execution over one hardware provider.
pub struct CourseRunner {
    provider: Arc<dyn HardwareProvider>,
    config:   RobotConfig,
}

impl CourseRunner {
    pub fn new(provider: Arc<dyn HardwareProvider>, config: RobotConfig) -> Self {
        Self { provider, config }
    }

    /// Run every `(plan, solver)` pair in order.
    ///
    /// A stage that exceeds its time budget is aborted (bounded join) and
    /// the course moves on; a stage fault (solver error or panic) ends the
    /// course run and propagates.
    pub fn run(
        &self,
        stages: Vec<(StagePlan, Box<dyn StageSolver>)>,
    ) -> StageResult<()> {
        for (plan, solver) in stages {
            self.run_stage(plan, solver)?;
        }
        info!("course complete");
        Ok(())
    }

    fn run_stage(&self, plan: StagePlan, solver: Box<dyn StageSolver>) -> StageResult<()> {
        let mut stage = StageController::new(
            plan.name.clone(),
            BoxedSolver(solver),
            self.provider.clone(),
            self.config,
        );
        stage.declare_resources(plan.resources)?;

        let t0 = Instant::now();
        stage.start()?;

        // Wait for natural completion, bounded by the plan's time budget.
        while stage.is_running() {
            if let Some(timeout) = plan.timeout {
                if t0.elapsed() >= timeout {
                    warn!(stage = %plan.name, ?timeout, "stage time budget exceeded, aborting");
                    break;
                }
            }
            thread::sleep(POLL);
        }

        let result = stage.stop(Some(STOP_JOIN));
        info!(stage = %plan.name, elapsed_ms = t0.elapsed().as_millis() as u64, "stage finished");
        result
    }
}

/// Adapter so an already-boxed solver satisfies `impl StageSolver`.
struct BoxedSolver(Box<dyn StageSolver>);

impl StageSolver for BoxedSolver {
    fn solve(&mut self, ctx: &crate::StageContext) -> StageResult<()> {
        self.0.solve(ctx)
    }
}
