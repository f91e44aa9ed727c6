//! `rally-core` — foundational types for the `rally` course-robot framework.
//!
//! This crate is a dependency of every other `rally-*` crate.  It
//! intentionally has no `rally-*` dependencies and minimal external ones
//! (only `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                            |
//! |---------------|-----------------------------------------------------|
//! | [`resources`] | `ResourceFlags` bitset, `Capability` enum           |
//! | [`signal`]    | `Signal` — cloneable one-way cancellation latch     |
//! | [`ports`]     | `MotorPort`, `SensorPort`, `PortMap`                |
//! | [`config`]    | `DriveGeometry`, `DriveConfig`, `RobotConfig`       |
//! | [`error`]     | `CoreError`, `CoreResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                    |
//! |---------|-----------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the public config types.|

pub mod config;
pub mod error;
pub mod ports;
pub mod resources;
pub mod signal;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{DriveConfig, DriveGeometry, RobotConfig};
pub use error::{CoreError, CoreResult};
pub use ports::{MotorPort, PortMap, SensorPort};
pub use resources::{Capability, ResourceFlags};
pub use signal::Signal;
