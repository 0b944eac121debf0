//! # Status Printer
//!
//! Drains the lock's event channel on a dedicated thread and renders every
//! event to a writer (stdout in the binary). Runs until every sender is
//! dropped, which happens once the simulation and its lock are gone.

use std::io::Write;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use reading_room_core::RoomEvent;

use crate::error::{SimulationError, SimulationResult};

const THREAD_NAME: &str = "status-printer";

/// Background renderer for [`RoomEvent`]s.
#[derive(Debug)]
pub struct StatusPrinter<W> {
    thread: JoinHandle<(W, u64)>,
}

impl<W: Write + Send + 'static> StatusPrinter<W> {
    /// Starts printing events from `events` into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Io`] if the thread cannot be spawned.
    pub fn spawn(events: Receiver<RoomEvent>, out: W) -> SimulationResult<Self> {
        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_owned())
            .spawn(move || print_loop(&events, out))?;
        Ok(Self { thread })
    }

    /// Waits for the channel to close and returns the writer with the
    /// number of events printed.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ThreadPanicked`] if the printer panicked.
    pub fn join(self) -> SimulationResult<(W, u64)> {
        self.thread
            .join()
            .map_err(|_| SimulationError::ThreadPanicked(THREAD_NAME.to_owned()))
    }
}

fn print_loop<W: Write>(events: &Receiver<RoomEvent>, mut out: W) -> (W, u64) {
    let mut printed = 0u64;
    let mut write_failed = false;

    for event in events {
        if !event.snapshot.holds_invariants() {
            tracing::error!(
                "Room invariant broken after {} ({}) {}: {:?}",
                event.name,
                event.role,
                event.kind,
                event.snapshot
            );
        }

        if write_failed {
            continue;
        }
        match write!(out, "{event}").and_then(|()| out.flush()) {
            Ok(()) => printed += 1,
            Err(err) => {
                // Keep draining so the lock never sees a full channel
                tracing::warn!("Status output failed, dropping further events: {err}");
                write_failed = true;
            }
        }
    }

    (out, printed)
}
