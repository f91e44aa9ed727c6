use thiserror::Error;

use rally_arbiter::ArbiterError;
use rally_core::CoreError;
use rally_hal::HalError;

#[derive(Debug, Error)]
pub enum StageError {
    /// Invalid resource combination (rejected before any hardware access).
    #[error(transparent)]
    Resource(#[from] CoreError),

    /// A hardware handle could not be opened (handles already opened by the
    /// same request have been closed again by the time this surfaces).
    #[error(transparent)]
    Hardware(#[from] HalError),

    /// Lifecycle misuse: declare after start, double start, and friends.
    #[error("stage state error: {0}")]
    State(&'static str),

    /// A stage accessor was used without declaring the matching capability.
    #[error("stage requires {0} but did not declare it")]
    MissingResource(rally_core::Capability),

    /// Like [`MissingResource`][StageError::MissingResource], for the drive
    /// accessor that either pilot capability would satisfy.
    #[error("stage declared neither pilot capability")]
    NoPilotDeclared,

    /// Arbitrator construction failed inside a solver.
    #[error(transparent)]
    Arbiter(#[from] ArbiterError),

    /// The stage thread panicked; resources were still released.
    #[error("stage thread panicked: {0}")]
    Panicked(String),

    /// Course plan parse problem (bad capability token, malformed row).
    #[error("course plan parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StageResult<T> = Result<T, StageError>;
