//! # Admission Permits
//!
//! RAII handles over an acquired admission. Dropping the permit releases it.

use super::lock::AdmissionLock;

/// Shared access held by one reader.
///
/// ## Usage
///
/// ```rust
/// use reading_room_core::{AdmissionLock, CancelToken};
///
/// let room = AdmissionLock::default();
/// let permit = room.read_permit("Reader-1", &CancelToken::never()).unwrap();
/// assert_eq!(room.active_reader_count(), 1);
/// drop(permit);
/// assert!(room.is_idle());
/// ```
#[derive(Debug)]
#[must_use = "dropping the permit releases the read immediately"]
pub struct ReadPermit<'a> {
    lock: &'a AdmissionLock,
    name: String,
}

impl<'a> ReadPermit<'a> {
    pub(crate) fn new(lock: &'a AdmissionLock, name: &str) -> Self {
        Self {
            lock,
            name: name.to_owned(),
        }
    }

    /// Name the read is held under.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ReadPermit<'_> {
    fn drop(&mut self) {
        self.lock.release_read(&self.name);
    }
}

/// Exclusive access held by the writer.
#[derive(Debug)]
#[must_use = "dropping the permit releases the write immediately"]
pub struct WritePermit<'a> {
    lock: &'a AdmissionLock,
    name: String,
}

impl<'a> WritePermit<'a> {
    pub(crate) fn new(lock: &'a AdmissionLock, name: &str) -> Self {
        Self {
            lock,
            name: name.to_owned(),
        }
    }

    /// Name the write is held under.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for WritePermit<'_> {
    fn drop(&mut self) {
        self.lock.release_write(&self.name);
    }
}
