//! `rally-hal` — hardware collaborator traits and the mock bench rig.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`device`]  | `Device` close/name contract, `Shared<T>` alias, `lock` helper |
//! | [`motor`]   | `Motor` trait, `SharedMotor`                                  |
//! | [`drive`]   | `Drive` pilot trait, `SharedDrive`                            |
//! | [`sensor`]  | `SampleSource` trait, touch threshold, `SharedSensor`         |
//! | [`display`] | `StatusDisplay` trait, `NullDisplay`, `SharedDisplay`         |
//! | [`filter`]  | `MeanFilter` — windowed mean over a shared sample source      |
//! | [`provider`]| `HardwareProvider` — the acquisition seam                     |
//! | [`mock`]    | Bench rig: scripted sensors, recording drives, counters       |
//! | [`error`]   | `HalError`, `HalResult<T>`                                    |
//!
//! # Design notes
//!
//! The framework never talks to concrete hardware types; stages receive
//! handles as `Arc<Mutex<dyn Trait>>` so one stage's behaviors can share a
//! sensor while the stage controller retains the handle for teardown.
//! Everything here is synchronous and blocking — the stage thread is the
//! only caller, and blocking sensor fetches are its suspension points.

pub mod device;
pub mod display;
pub mod drive;
pub mod error;
pub mod filter;
pub mod mock;
pub mod motor;
pub mod provider;
pub mod sensor;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use device::{lock, Device, Shared};
pub use display::{NullDisplay, SharedDisplay, StatusDisplay};
pub use drive::{Drive, SharedDrive};
pub use error::{HalError, HalResult};
pub use filter::MeanFilter;
pub use motor::{Motor, SharedMotor};
pub use provider::HardwareProvider;
pub use sensor::{SampleSource, SharedSensor, TOUCH_THRESHOLD};
