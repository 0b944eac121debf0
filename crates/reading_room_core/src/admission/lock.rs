//! # The Admission Lock
//!
//! All room state lives behind one mutex. A blocked acquire never holds it:
//! the waiter parks on its ticket's wake channel and its cancel token, then
//! re-takes the mutex and re-checks eligibility.
//!
//! ```text
//!   acquire ──> enqueue ticket ──> ┌──────────────────────┐
//!                                  │ lock; cancelled?     │──yes──> retract, wake all, Err
//!                                  │ lock; eligible?      │──yes──> retract, occupy, Ok
//!                                  └──────────┬───────────┘
//!                                             │ no (unlock)
//!                                  select { wake | cancel } ──┐
//!                                             ▲               │
//!                                             └───────────────┘
//! ```

use std::collections::VecDeque;

use crossbeam_channel::{select, Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use super::eligibility::{self, Occupancy};
use super::permit::{ReadPermit, WritePermit};
use super::snapshot::{QueuedRequest, RoomEvent, RoomEventKind, RoomSnapshot};
use super::ticket::{Role, TicketId, WaitTicket};
use crate::cancel::CancelToken;
use crate::config::AdmissionConfig;
use crate::error::{AdmissionError, AdmissionResult};

/// Mutable room state. Only ever touched under [`AdmissionLock::state`].
#[derive(Debug, Default)]
struct RoomState {
    /// Active readers, in admission order.
    readers: Vec<String>,
    /// Active writer.
    writer: Option<String>,
    /// Pending tickets, head first.
    queue: VecDeque<WaitTicket>,
    /// Next ticket id to issue.
    next_ticket: u64,
}

impl RoomState {
    fn enqueue(&mut self, name: &str, role: Role) -> (TicketId, Receiver<()>) {
        let id = TicketId::new(self.next_ticket);
        self.next_ticket += 1;
        let (ticket, wake) = WaitTicket::issue(id, name, role);
        self.queue.push_back(ticket);
        (id, wake)
    }

    /// Removes a ticket, keeping everyone else's order.
    fn retract(&mut self, id: TicketId) {
        if let Some(position) = self.queue.iter().position(|ticket| ticket.id == id) {
            self.queue.remove(position);
        }
    }

    fn occupancy(&self, max_readers: usize) -> Occupancy {
        Occupancy {
            readers: self.readers.len(),
            writer: self.writer.is_some(),
            max_readers,
        }
    }

    fn may_enter(&self, id: TicketId, max_readers: usize) -> bool {
        eligibility::may_enter(
            id,
            self.queue.iter().map(|ticket| (ticket.id, ticket.role)),
            self.occupancy(max_readers),
        )
    }

    /// Wakes every waiter so each re-checks its own eligibility.
    fn wake_all(&self) {
        for ticket in &self.queue {
            ticket.wake();
        }
    }

    fn snapshot(&self, max_readers: usize) -> RoomSnapshot {
        RoomSnapshot {
            readers: self.readers.clone(),
            writer: self.writer.clone(),
            queue: self
                .queue
                .iter()
                .map(|ticket| QueuedRequest {
                    ticket: ticket.id,
                    name: ticket.name.clone(),
                    role: ticket.role,
                })
                .collect(),
            max_readers,
        }
    }
}

/// Bounded, FIFO-fair readers-writer admission lock.
///
/// Admits up to `max_readers` readers at once, or exactly one writer. A
/// reader never overtakes a writer queued ahead of it, and a writer enters
/// only from the head of the queue, so neither class starves.
///
/// ## Usage
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use reading_room_core::{AdmissionLock, CancelSource};
///
/// let room = Arc::new(AdmissionLock::new(2).unwrap());
/// let stop = CancelSource::new();
///
/// let writer = {
///     let room = Arc::clone(&room);
///     let token = stop.token();
///     thread::spawn(move || {
///         let _permit = room.write_permit("Writer-1", &token)?;
///         Ok::<_, reading_room_core::AdmissionError>(())
///     })
/// };
///
/// writer.join().unwrap().unwrap();
/// assert!(room.is_idle());
/// ```
///
/// ## Misuse
///
/// The lock trusts callers to pair every release with a prior acquire under
/// the same name. An unmatched release panics in debug builds and is
/// ignored with a warning in release builds.
#[derive(Debug)]
pub struct AdmissionLock {
    state: Mutex<RoomState>,
    max_readers: usize,
    observer: Option<Sender<RoomEvent>>,
}

impl AdmissionLock {
    /// Creates a lock admitting up to `max_readers` concurrent readers.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::InvalidCapacity`] if `max_readers` is zero.
    pub fn new(max_readers: usize) -> AdmissionResult<Self> {
        Self::from_config(AdmissionConfig { max_readers })
    }

    /// Creates a lock from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::InvalidCapacity`] if the capacity is zero.
    pub fn from_config(config: AdmissionConfig) -> AdmissionResult<Self> {
        config.validate()?;
        Ok(Self {
            state: Mutex::new(RoomState::default()),
            max_readers: config.max_readers,
            observer: None,
        })
    }

    /// Attaches an observer that receives a [`RoomEvent`] after every state
    /// change.
    ///
    /// Events are sent without blocking. If the channel is full the event
    /// is dropped.
    #[must_use]
    pub fn with_observer(mut self, observer: Sender<RoomEvent>) -> Self {
        self.observer = Some(observer);
        self
    }

    // =========================================================================
    // Admission
    // =========================================================================

    /// Queues a reader and blocks until it may enter.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Cancelled`] if `cancel` fires before entry
    /// is granted. The ticket is out of the queue by the time this returns.
    pub fn acquire_read(&self, name: &str, cancel: &CancelToken) -> AdmissionResult<()> {
        self.acquire(name, Role::Reader, cancel)
    }

    /// Releases a read previously acquired under `name`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `name` is not an active reader.
    pub fn release_read(&self, name: &str) {
        let mut state = self.state.lock();

        let position = state.readers.iter().position(|reader| reader == name);
        debug_assert!(position.is_some(), "{name} released a read it does not hold");
        let Some(position) = position else {
            tracing::warn!("{name} released a read it does not hold, ignoring");
            return;
        };

        state.readers.remove(position);
        self.report(&state, RoomEventKind::Left, name, Role::Reader);
        state.wake_all();
    }

    /// Queues a writer and blocks until it may enter.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Cancelled`] if `cancel` fires before entry
    /// is granted. The ticket is out of the queue by the time this returns.
    pub fn acquire_write(&self, name: &str, cancel: &CancelToken) -> AdmissionResult<()> {
        self.acquire(name, Role::Writer, cancel)
    }

    /// Releases the write held under `name`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `name` is not the active writer.
    pub fn release_write(&self, name: &str) {
        let mut state = self.state.lock();

        let held = state.writer.as_deref() == Some(name);
        debug_assert!(held, "{name} released a write it does not hold");
        if !held {
            tracing::warn!("{name} released a write it does not hold, ignoring");
            return;
        }

        state.writer = None;
        self.report(&state, RoomEventKind::Left, name, Role::Writer);
        state.wake_all();
    }

    /// Acquires a read and returns a permit that releases it on drop.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Cancelled`] if the wait is cancelled.
    pub fn read_permit(&self, name: &str, cancel: &CancelToken) -> AdmissionResult<ReadPermit<'_>> {
        self.acquire_read(name, cancel)?;
        Ok(ReadPermit::new(self, name))
    }

    /// Acquires the write and returns a permit that releases it on drop.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Cancelled`] if the wait is cancelled.
    pub fn write_permit(
        &self,
        name: &str,
        cancel: &CancelToken,
    ) -> AdmissionResult<WritePermit<'_>> {
        self.acquire_write(name, cancel)?;
        Ok(WritePermit::new(self, name))
    }

    fn acquire(&self, name: &str, role: Role, cancel: &CancelToken) -> AdmissionResult<()> {
        let (ticket, wake) = {
            let mut state = self.state.lock();
            let issued = state.enqueue(name, role);
            self.report(&state, RoomEventKind::Requested, name, role);
            issued
        };

        loop {
            {
                let mut state = self.state.lock();

                if cancel.is_cancelled() {
                    state.retract(ticket);
                    self.report(&state, RoomEventKind::Cancelled, name, role);
                    // A retracted writer may have been holding back the readers behind it.
                    state.wake_all();
                    return Err(AdmissionError::Cancelled {
                        name: name.to_owned(),
                        role,
                    });
                }

                if state.may_enter(ticket, self.max_readers) {
                    state.retract(ticket);
                    match role {
                        Role::Reader => state.readers.push(name.to_owned()),
                        Role::Writer => state.writer = Some(name.to_owned()),
                    }
                    self.report(&state, RoomEventKind::Entered, name, role);
                    // A writer entering frees nothing, a reader may leave room for more.
                    if role == Role::Reader {
                        state.wake_all();
                    }
                    return Ok(());
                }
            }

            select! {
                recv(wake) -> _ => {}
                recv(cancel.receiver()) -> _ => {}
            }
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Number of active readers.
    #[must_use]
    pub fn active_reader_count(&self) -> usize {
        self.state.lock().readers.len()
    }

    /// Number of active writers (0 or 1).
    #[must_use]
    pub fn active_writer_count(&self) -> usize {
        usize::from(self.state.lock().writer.is_some())
    }

    /// Number of tickets waiting in the queue.
    #[must_use]
    pub fn queue_length(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Returns true if nobody is inside. Waiters do not count.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.readers.is_empty() && state.writer.is_none()
    }

    /// Names of the active readers, in admission order.
    #[must_use]
    pub fn active_reader_names(&self) -> Vec<String> {
        self.state.lock().readers.clone()
    }

    /// Name of the active writer.
    #[must_use]
    pub fn active_writer_name(&self) -> Option<String> {
        self.state.lock().writer.clone()
    }

    /// Reader capacity, fixed at construction.
    #[inline]
    #[must_use]
    pub fn max_readers(&self) -> usize {
        self.max_readers
    }

    /// Full copy of occupants and queue.
    #[must_use]
    pub fn snapshot(&self) -> RoomSnapshot {
        self.state.lock().snapshot(self.max_readers)
    }

    fn report(&self, state: &RoomState, kind: RoomEventKind, name: &str, role: Role) {
        tracing::debug!(
            readers = state.readers.len(),
            writer = state.writer.is_some(),
            queued = state.queue.len(),
            "{name} ({role}) {kind}"
        );

        if let Some(observer) = &self.observer {
            let event = RoomEvent {
                kind,
                name: name.to_owned(),
                role,
                snapshot: state.snapshot(self.max_readers),
            };
            if let Err(TrySendError::Full(_)) = observer.try_send(event) {
                tracing::trace!("status observer is full, dropping event");
            }
        }
    }
}

impl Default for AdmissionLock {
    fn default() -> Self {
        Self {
            state: Mutex::new(RoomState::default()),
            max_readers: crate::config::DEFAULT_MAX_READERS,
            observer: None,
        }
    }
}
