//! `rally-arbiter` — priority-based behavior arbitration (subsumption).
//!
//! # Crate layout
//!
//! | Module         | Contents                          |
//! |----------------|-----------------------------------|
//! | [`arbitrator`] | The `Arbitrator` and its run loop |
//! | [`error`]      | `ArbiterError`, `ArbiterResult`   |
//!
//! # Design notes
//!
//! The arbitrator owns an ordered list of behaviors (index 0 = highest
//! priority) and guarantees that at most one action runs at a time.  The
//! selection loop runs on the calling (stage) thread; a scoped monitor
//! thread exists only to flip the suppression latch of the running
//! behavior the moment a higher-priority trigger becomes true or a stop is
//! requested.  Actions never run on the monitor.

pub mod arbitrator;
pub mod error;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use arbitrator::Arbitrator;
pub use error::{ArbiterError, ArbiterResult};
