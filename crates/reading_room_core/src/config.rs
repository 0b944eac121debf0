//! # Admission Configuration
//!
//! Fixed at construction. Loaded once, never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{AdmissionError, AdmissionResult};

/// Default number of readers allowed in the room at once.
pub const DEFAULT_MAX_READERS: usize = 5;

/// Configuration for an [`AdmissionLock`](crate::AdmissionLock).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Maximum number of concurrent readers.
    pub max_readers: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_readers: DEFAULT_MAX_READERS,
        }
    }
}

impl AdmissionConfig {
    /// Checks that the configuration can build a usable lock.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::InvalidCapacity`] when `max_readers` is zero,
    /// since no reader could ever be admitted and every ticket behind one
    /// would wait forever.
    pub fn validate(&self) -> AdmissionResult<()> {
        if self.max_readers == 0 {
            return Err(AdmissionError::InvalidCapacity(self.max_readers));
        }
        Ok(())
    }
}
