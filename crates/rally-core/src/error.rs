//! Core error type.
//!
//! Sub-crates define their own error enums and either convert `CoreError`
//! into them via `From` impls or wrap it as one variant.

use thiserror::Error;

use crate::Capability;

/// Errors raised by `rally-core` validation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("resource conflict: {0} cannot be combined with {1}")]
    Conflict(Capability, Capability),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for core validation.
pub type CoreResult<T> = Result<T, CoreError>;
