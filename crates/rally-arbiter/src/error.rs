use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArbiterError {
    #[error("an arbitrator needs at least one behavior")]
    NoBehaviors,
}

pub type ArbiterResult<T> = Result<T, ArbiterError>;
