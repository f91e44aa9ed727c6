//! The `StageSolver` trait — the per-stage strategy hook.

use crate::{StageContext, StageResult};

/// What a stage actually does once its resources are acquired.
///
/// Implementations typically either build behaviors and an
/// `Arbitrator` (wired to [`StageContext::exit_signal`]) and run it, or
/// perform direct sequential sensor-driven logic for stages that don't
/// need arbitration.  Runs on the stage's own thread; an `Err` (or a
/// panic) is surfaced to whoever joins the stage, after the context has
/// released all hardware.
pub trait StageSolver: Send {
    fn solve(&mut self, ctx: &StageContext) -> StageResult<()>;
}

/// Closures work as solvers — handy for tests and small stages.
impl<F> StageSolver for F
where
    F: FnMut(&StageContext) -> StageResult<()> + Send,
{
    fn solve(&mut self, ctx: &StageContext) -> StageResult<()> {
        self(ctx)
    }
}
