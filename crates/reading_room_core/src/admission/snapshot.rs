//! # Room Snapshots and Events
//!
//! Point-in-time copies of the room for observers. Nothing here aliases the
//! lock's internal state.

use std::fmt;

use serde::Serialize;

use super::ticket::{Role, TicketId};

/// One entry of the wait queue as seen from outside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueuedRequest {
    /// Ticket identity.
    pub ticket: TicketId,
    /// Requester name.
    pub name: String,
    /// Requested role.
    pub role: Role,
}

/// Copy of the room's occupants and wait queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoomSnapshot {
    /// Active readers, in admission order.
    pub readers: Vec<String>,
    /// Active writer, if any.
    pub writer: Option<String>,
    /// Wait queue, head first.
    pub queue: Vec<QueuedRequest>,
    /// Reader capacity of the room.
    pub max_readers: usize,
}

impl RoomSnapshot {
    /// Queued requests of one role, in FIFO order.
    pub fn queued(&self, role: Role) -> impl Iterator<Item = &QueuedRequest> + '_ {
        self.queue.iter().filter(move |request| request.role == role)
    }

    /// Returns true if the occupants respect exclusion and capacity.
    #[must_use]
    pub fn holds_invariants(&self) -> bool {
        (self.writer.is_none() || self.readers.is_empty())
            && self.readers.len() <= self.max_readers
    }
}

fn write_names<'a>(
    f: &mut fmt::Formatter<'_>,
    names: impl Iterator<Item = &'a str>,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, name) in names.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(name)?;
    }
    f.write_str("]")
}

impl fmt::Display for RoomSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IN THE ROOM:")?;
        write!(f, "  Writers ({}): ", usize::from(self.writer.is_some()))?;
        write_names(f, self.writer.iter().map(String::as_str))?;
        writeln!(f)?;
        write!(f, "  Readers ({}/{}): ", self.readers.len(), self.max_readers)?;
        write_names(f, self.readers.iter().map(String::as_str))?;
        writeln!(f)?;

        writeln!(f, "IN THE QUEUE:")?;
        for (label, role) in [("Writers", Role::Writer), ("Readers", Role::Reader)] {
            write!(f, "  {label} ({}): ", self.queued(role).count())?;
            write_names(f, self.queued(role).map(|request| request.name.as_str()))?;
            writeln!(f)?;
        }

        write!(f, "  Order: [")?;
        for (i, request) in self.queue.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}({})", request.name, request.role.tag())?;
        }
        writeln!(f, "]")
    }
}

/// What happened to the room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomEventKind {
    /// A ticket joined the tail of the queue.
    Requested,
    /// A ticket was granted and its holder became active.
    Entered,
    /// An active holder released.
    Left,
    /// A waiter gave up and its ticket was retracted.
    Cancelled,
}

impl fmt::Display for RoomEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Requested => "wants to enter",
            Self::Entered => "ENTERS",
            Self::Left => "LEAVES",
            Self::Cancelled => "gives up waiting",
        })
    }
}

/// A state change together with the room as it stood right after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoomEvent {
    /// Kind of change.
    pub kind: RoomEventKind,
    /// Name of the actor the change concerns.
    pub name: String,
    /// Role of that actor.
    pub role: Role,
    /// Room after the change.
    pub snapshot: RoomSnapshot,
}

impl fmt::Display for RoomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========================================")?;
        writeln!(f, "EVENT: {} ({}) {}", self.name, self.role, self.kind)?;
        writeln!(f, "----------------------------------------")?;
        write!(f, "{}", self.snapshot)?;
        writeln!(f, "========================================")
    }
}
