//! Unified error type for the end-to-end pipeline.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] voltaic_core::Error),

    #[error(transparent)]
    Reduce(#[from] voltaic_reduce::Error),

    #[error(transparent)]
    Solve(#[from] voltaic_solver::Error),

    #[error(transparent)]
    Label(#[from] crate::label::LabelError),
}

pub type Result<T> = std::result::Result<T, Error>;
