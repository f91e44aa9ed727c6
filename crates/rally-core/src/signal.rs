//! `Signal` — a cloneable one-way latch for cooperative cancellation.
//!
//! One `Signal` backs each of the cross-thread flags in the framework: the
//! stage abort flag, and the arbitrator stop token that behaviors raise to
//! end the arbitration loop.  Raising is idempotent (there is no reset), so
//! repeated `stop()` requests are harmless by construction.
//!
//! Single-writer/multi-reader convention: only the controlling side calls
//! [`Signal::set`]; everyone else polls [`Signal::is_set`] from their loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable one-way latch.  All clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct Signal {
    flag: Arc<AtomicBool>,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the latch.  Idempotent; never resets.
    pub fn set(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// `true` once [`set`][Signal::set] has been called on any clone.
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
