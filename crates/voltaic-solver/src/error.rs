//! Error types for voltaic-solver.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("singular or inconsistent system")]
    Singular,

    #[error("invalid matrix dimensions: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("no independent sources")]
    NoSources,

    #[error("superposition case for source {source_name} failed: {cause}")]
    SourceCase {
        source_name: String,
        cause: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
