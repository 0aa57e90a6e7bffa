//! Error types for u-timetable

use thiserror::Error;

use crate::config::ConfigError;
use crate::persistence::PersistenceError;
use crate::validation::ValidationError;

/// Main error type for timetabling operations
#[derive(Debug, Error)]
pub enum TimetableError {
    /// Input cannot be interpreted (no tasks, unknown catalog entries)
    #[error("Invalid input: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),

    /// Rules could not be loaded or are unusable
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Schedule store failed; nothing was committed
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// A manual placement was rejected
    #[error("Placement rejected: {0}")]
    Placement(String),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for TimetableError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::InvalidInput(errors)
    }
}

/// Result type alias for timetabling operations
pub type Result<T> = std::result::Result<T, TimetableError>;
