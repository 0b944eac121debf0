//! # Eligibility Rule
//!
//! Decides whether one queued ticket may enter right now.
//!
//! ```text
//!   head                                              tail
//!    ┌────┬────┬────┬────┬────┐
//!    │ R1 │ R2 │ W1 │ R3 │ W2 │
//!    └────┴────┴────┴────┴────┘
//!      ✓    ✓    ·    ✗    ✗      (room empty, capacity 5)
//!
//!   R1, R2: seats for both                     -> may enter
//!   W1:     not the head                       -> waits for R1, R2
//!   R3:     writer W1 ahead                    -> may not jump it
//!   W2:     not the head                       -> waits
//! ```
//!
//! Evaluated under the lock's mutex over the queue as it stands.

use super::ticket::{Role, TicketId};

/// Current occupancy of the room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Occupancy {
    /// Active readers.
    pub(crate) readers: usize,
    /// Whether a writer is active.
    pub(crate) writer: bool,
    /// Reader capacity.
    pub(crate) max_readers: usize,
}

/// Returns true if `ticket` may be granted given the queue (head first) and
/// the current occupancy.
///
/// - Reader: no active writer, no writer ticket ahead of it, and a free seat
///   left after every reader queued ahead of it has been seated.
/// - Writer: empty room and at the head of the queue.
///
/// A ticket that is not in the queue is never eligible.
pub(crate) fn may_enter<I>(ticket: TicketId, queue: I, occupancy: Occupancy) -> bool
where
    I: IntoIterator<Item = (TicketId, Role)>,
{
    if occupancy.writer {
        return false;
    }

    let mut readers_ahead = 0;
    for (position, (id, role)) in queue.into_iter().enumerate() {
        if id == ticket {
            return match role {
                Role::Reader => occupancy.readers + readers_ahead < occupancy.max_readers,
                Role::Writer => position == 0 && occupancy.readers == 0,
            };
        }
        match role {
            Role::Reader => readers_ahead += 1,
            Role::Writer => return false,
        }
    }

    false
}
