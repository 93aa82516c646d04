//! Error types for voltaic-core.

use thiserror::Error;

use crate::id::Uid;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("edge {edge} references a missing node")]
    MissingEndpoint { edge: Uid },

    #[error("terminal references a missing node")]
    MissingTerminal { vertex: Uid },

    #[error("terminals coincide")]
    TerminalsCoincide,

    #[error("terminals are shorted by wire")]
    TerminalsShorted,

    #[error("voltage source {id} shorted by wire")]
    SourceShorted { id: Uid },

    #[error("too few distinct nodes")]
    TooFewNodes,

    #[error("no components")]
    NoComponents,

    #[error("resistor {id} has non-finite or non-positive ohms ({ohms})")]
    BadOhms { id: Uid, ohms: f64 },

    #[error("source {id} has a non-finite value ({value})")]
    BadSourceValue { id: Uid, value: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
