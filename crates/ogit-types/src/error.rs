use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex object id: {0}")]
    InvalidHex(String),

    #[error("invalid object id length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
