//! Error kinds surfaced by model and store operations.

use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A field failed its invariant. Raised before anything is written.
    #[error("{0}")]
    Validation(String),

    /// An id did not resolve to a row.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// SQLite rejected a write on a key or check constraint.
    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error(transparent)]
    Database(rusqlite::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
            Self::Constraint(e.to_string())
        } else {
            Self::Database(e)
        }
    }
}
