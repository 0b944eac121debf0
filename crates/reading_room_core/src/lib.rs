//! # Reading Room Core
//!
//! A bounded, starvation-free readers-writer admission lock:
//! - Up to `max_readers` concurrent readers, or exactly one writer
//! - Strict FIFO wait queue, so neither class starves
//! - Cooperative cancellation of blocked waiters
//!
//! ## Admission Rules
//!
//! 1. **Readers share** - but never past the configured capacity
//! 2. **Writers are exclusive** - an active writer means an empty reader set
//! 3. **Nobody jumps a writer** - a reader queued behind a writer waits for it
//!
//! ## Example
//!
//! ```rust
//! use reading_room_core::{AdmissionLock, CancelToken};
//!
//! let room = AdmissionLock::new(5).unwrap();
//! let never = CancelToken::never();
//!
//! room.acquire_read("Reader-1", &never).unwrap();
//! assert_eq!(room.active_reader_count(), 1);
//! room.release_read("Reader-1");
//!
//! {
//!     let _permit = room.write_permit("Writer-1", &never).unwrap();
//!     assert_eq!(room.active_writer_name().as_deref(), Some("Writer-1"));
//! }
//! assert!(room.is_idle());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod admission;
pub mod cancel;
pub mod config;
pub mod error;

pub use admission::{
    AdmissionLock, QueuedRequest, ReadPermit, Role, RoomEvent, RoomEventKind, RoomSnapshot,
    TicketId, WritePermit,
};
pub use cancel::{CancelSource, CancelToken};
pub use config::{AdmissionConfig, DEFAULT_MAX_READERS};
pub use error::{AdmissionError, AdmissionResult};
