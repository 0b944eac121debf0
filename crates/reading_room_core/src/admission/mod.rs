//! # Admission Control for the Reading Room
//!
//! ## The Problem
//!
//! ```text
//! Readers:  may share the room, up to a fixed capacity
//! Writers:  need the room to themselves
//!
//! Readers-first lock:  a steady trickle of readers STARVES writers
//! Writers-first lock:  a steady trickle of writers STARVES readers
//! ```
//!
//! ## The Solution: One FIFO Queue
//!
//! ```text
//!   tail ──> [ R5 | W2 | R4 | R3 | W1 ] ──> head ──> ROOM
//!
//!   Readers at the head enter together while capacity lasts.
//!   A writer enters alone, and only from the head.
//!   Nobody behind a writer passes it.
//! ```
//!
//! Every release wakes all waiters; each one re-checks its own eligibility.

mod eligibility;
mod lock;
mod permit;
mod snapshot;
mod ticket;

pub use lock::AdmissionLock;
pub use permit::{ReadPermit, WritePermit};
pub use snapshot::{QueuedRequest, RoomEvent, RoomEventKind, RoomSnapshot};
pub use ticket::{Role, TicketId};
