//! Error types for voltaic-export.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A semantically invalid document; the first failure wins.
    #[error("{path}: {message}")]
    Invalid { path: String, message: String },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Invalid {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
