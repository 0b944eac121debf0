//! # Wait Tickets
//!
//! One ticket per pending acquire. Identity is the [`TicketId`], never the
//! requester name: the same actor may be queued again after a prior cycle.

use std::fmt;

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// The class of access a ticket asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shared access, up to the room's reader capacity.
    Reader,
    /// Exclusive access.
    Writer,
}

impl Role {
    /// Single-letter tag used in queue renderings.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::Reader => 'R',
            Self::Writer => 'W',
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reader => f.write_str("reader"),
            Self::Writer => f.write_str("writer"),
        }
    }
}

/// Unique identity of a queued request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TicketId(u64);

impl TicketId {
    /// Creates a ticket id from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id. Ids are issued in enqueue order.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A pending request sitting in the wait queue.
#[derive(Debug)]
pub(crate) struct WaitTicket {
    pub(crate) id: TicketId,
    pub(crate) name: String,
    pub(crate) role: Role,
    /// Single-slot wake handle. The waiter holds the receiving end.
    wake: Sender<()>,
}

impl WaitTicket {
    /// Issues a ticket together with the receiver its waiter blocks on.
    pub(crate) fn issue(id: TicketId, name: &str, role: Role) -> (Self, Receiver<()>) {
        let (wake, receiver) = bounded(1);
        let ticket = Self {
            id,
            name: name.to_owned(),
            role,
            wake,
        };
        (ticket, receiver)
    }

    /// Wakes the waiter so it re-checks its eligibility.
    ///
    /// Never blocks. A full slot already holds a pending wake.
    #[inline]
    pub(crate) fn wake(&self) {
        let _ = self.wake.try_send(());
    }
}
