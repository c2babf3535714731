//! Error types for the configuration subsystem.
//!
//! Validation errors are user mistakes and get turned into a reply by the
//! config command. Everything else propagates to the caller.

use std::sync::Arc;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Malformed user input for a config command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("`{0}` is not a valid config option")]
    UnknownField(String),

    #[error("`{verb}` is not a valid action for `{field}`, expected one of: {}", .allowed.join(", "))]
    UnknownVerb {
        field: String,
        verb: String,
        allowed: &'static [&'static str],
    },

    #[error("`{0}` needs a value")]
    MissingArgument(String),

    #[error("{0}")]
    BadArgument(String),

    #[error("`{value}` is not in `{field}`")]
    NotPresent { field: String, value: String },
}

/// Crate-wide error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("document store error: {0}")]
    Store(#[from] mongodb::error::Error),

    #[error(transparent)]
    Platform(#[from] anyhow::Error),

    /// Failure of a coalesced cache computation, shared by every waiter.
    #[error(transparent)]
    Shared(#[from] Arc<Error>),
}

impl Error {
    /// The validation error behind this error, looking through shared errors.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Shared(inner) => inner.as_validation(),
            _ => None,
        }
    }
}
