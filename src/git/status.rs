//! Clone outcome enumeration and the clone error taxonomy

use thiserror::Error;

use crate::core::config::EXISTS_ERROR_MARKER;

/// Result of a clone job that did not fail fatally
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloneOutcome {
    /// Repository was cloned into a fresh directory
    Cloned,
    /// Destination already held files, so nothing was cloned
    Skipped,
}

impl CloneOutcome {
    /// Returns the emoji symbol for this outcome
    pub fn symbol(&self) -> &str {
        match self {
            CloneOutcome::Cloned => "🟢",
            CloneOutcome::Skipped => "🟠",
        }
    }

    /// Returns the text representation of this outcome
    pub fn text(&self) -> &str {
        match self {
            CloneOutcome::Cloned => "cloned",
            CloneOutcome::Skipped => "skip",
        }
    }
}

/// Errors a clone function can report
#[derive(Debug, Error)]
pub enum CloneError {
    /// The destination directory exists and is not empty. Not fatal.
    #[error("{0}")]
    DestinationExists(String),

    /// The clone was aborted because the pool was cancelled
    #[error("clone cancelled")]
    Cancelled,

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl CloneError {
    /// Whether this error only means the job should be skipped
    pub fn is_skip(&self) -> bool {
        match self {
            CloneError::DestinationExists(_) => true,
            CloneError::Git(e) => {
                e.code() == git2::ErrorCode::Exists || e.message().contains(EXISTS_ERROR_MARKER)
            }
            CloneError::Other(message) => message.contains(EXISTS_ERROR_MARKER),
            CloneError::Cancelled | CloneError::Io(_) => false,
        }
    }
}
