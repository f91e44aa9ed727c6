//! `rally-behavior` — the reactive behavior protocol and built-in behaviors.
//!
//! # Crate layout
//!
//! | Module           | Contents                                           |
//! |------------------|----------------------------------------------------|
//! | [`state`]        | `BehaviorState` — suppression/termination flags    |
//! | [`model`]        | `Behavior` trait                                   |
//! | [`bumper_escape`]| `BumperEscape` — back off and turn on bumper hit   |
//! | [`cruise`]       | `Cruise` — lowest-priority default forward drive   |
//!
//! # Design notes
//!
//! A behavior is a self-contained reactive unit: a cheap trigger check, an
//! interruptible action, and two latches (suppressed, terminated) the
//! arbitration layer flips from its monitor.  All methods take `&self` and
//! behaviors are `Send + Sync` — actions run on the stage thread while the
//! arbitrator's monitor concurrently re-evaluates triggers, so mutable
//! state lives in atomics ([`BehaviorState`]) and hardware access goes
//! through the shared `rally-hal` handles.

pub mod bumper_escape;
pub mod cruise;
pub mod model;
pub mod state;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use bumper_escape::BumperEscape;
pub use cruise::Cruise;
pub use model::Behavior;
pub use state::BehaviorState;
