//! `rally-stage` — the stage lifecycle: exclusive resource ownership, one
//! thread per stage, and course sequencing.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`resources`] | `acquire` + `AcquiredResources` (release-on-drop guard) |
//! | [`context`]   | `StageContext` — what a running stage sees              |
//! | [`solver`]    | `StageSolver` trait (closures welcome)                  |
//! | [`controller`]| `StageController` — declare / start / stop / is_active  |
//! | [`loader`]    | CSV course-plan loader                                  |
//! | [`runner`]    | `CourseRunner` — sequential stage execution             |
//! | [`error`]     | `StageError`, `StageResult<T>`                          |
//!
//! # Lifecycle
//!
//! ```rust,ignore
//! let mut stage = StageController::new("obstacle", solver, provider, config);
//! stage.declare_resources(ResourceFlags::UNREG_PILOT | ResourceFlags::TOUCH)?;
//! stage.start()?;                                  // acquires, then spawns
//! // ... the stage thread runs solve() ...
//! stage.stop(Some(Duration::from_secs(5)))?;       // abort + bounded join
//! ```
//!
//! Resource release is unconditional: the stage context owns the acquired
//! handles and closes every one of them exactly once when it drops — on
//! normal `solve()` return, on an `Err`, and on a panic unwinding the
//! stage thread.

pub mod context;
pub mod controller;
pub mod error;
pub mod loader;
pub mod resources;
pub mod runner;
pub mod solver;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use context::StageContext;
pub use controller::StageController;
pub use error::{StageError, StageResult};
pub use loader::{load_course_csv, load_course_reader, StagePlan};
pub use resources::{acquire, AcquiredResources};
pub use runner::CourseRunner;
pub use solver::StageSolver;
