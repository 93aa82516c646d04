//! Error types for voltaic-reduce.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("not reducible by series/parallel")]
    NotSeriesParallel,

    #[error("reduction limit reached")]
    LimitReached,

    #[error("ammeter-only parallel branch creates a short")]
    AmmeterShort,

    #[error("empty parallel branch creates a short")]
    EmptyBranch,

    #[error("zero-ohm series run creates a short")]
    ZeroOhmSeries,

    #[error("parallel branch at 0 ohms creates a short")]
    ZeroOhmBranch,
}

pub type Result<T> = std::result::Result<T, Error>;
