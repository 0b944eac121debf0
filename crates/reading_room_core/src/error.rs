//! # Admission Error Types
//!
//! Everything an admission call can report back to its caller.

use thiserror::Error;

use crate::admission::Role;

/// Errors that can occur when constructing or entering the reading room.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The wait was cancelled before entry was granted.
    ///
    /// Not a failure of the lock: the ticket was retracted and the caller
    /// never entered the protected region.
    #[error("{role} {name} cancelled while waiting for admission")]
    Cancelled {
        /// Name the ticket was queued under.
        name: String,
        /// Role the ticket requested.
        role: Role,
    },

    /// Reader capacity must be at least one.
    #[error("invalid reader capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),
}

impl AdmissionError {
    /// Returns true if this error is a cancelled wait.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result type for admission operations.
pub type AdmissionResult<T> = Result<T, AdmissionError>;
