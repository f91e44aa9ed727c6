use thiserror::Error;

#[derive(Debug, Error)]
pub enum HalError {
    #[error("failed to open {device} on {port}: {reason}")]
    Open {
        device: String,
        port:   String,
        reason: String,
    },

    #[error("failed to close {device}: {reason}")]
    Close { device: String, reason: String },

    #[error("sample fetch failed on {device}: {reason}")]
    Sample { device: String, reason: String },
}

pub type HalResult<T> = Result<T, HalError>;
