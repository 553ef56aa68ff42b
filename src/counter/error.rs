use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("days must be between 1 and {max}, got {requested}")]
    DaysOutOfRange { requested: u32, max: u32 },
}

#[derive(Debug, Error)]
pub enum CounterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A store call failed. Mutations already applied in the same call are not rolled back.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("counter {key} holds a non-numeric value")]
    CorruptCounter { key: String },
}
