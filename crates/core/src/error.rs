use serde::Serialize;

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Timecode(#[from] TimecodeError),
}

/// Errors produced by the timecode engine.
///
/// `Format` means the input is not a timecode at all; `OutOfRange` means a
/// well-formed timecode does not fit the framerate it was paired with.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
pub enum TimecodeError {
    /// Negative or non-finite seconds, or a non-positive framerate.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The string is not four colon-separated numeric fields.
    #[error("Invalid timecode format: {0}")]
    Format(String),

    /// A field is numeric but exceeds its limit for the given framerate.
    #[error("Timecode field {field} = {value} is out of range (limit {limit})")]
    OutOfRange {
        field: &'static str,
        value: u64,
        limit: f64,
    },
}

impl TimecodeError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }
}
