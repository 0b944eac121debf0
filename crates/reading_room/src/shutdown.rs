//! # Shutdown
//!
//! Ctrl+C is turned into a message on a channel, so the main thread can wait
//! on it alongside the run deadline and then take the normal
//! [`Simulation::stop`](crate::Simulation::stop) path.

use std::time::Duration;

use crossbeam_channel::{after, bounded, never, select, Receiver};

use crate::error::SimulationResult;

/// Why [`wait_for_stop`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The run duration elapsed.
    Elapsed,
    /// An interrupt arrived, or its channel closed.
    Interrupted,
}

/// Routes Ctrl+C to the returned receiver.
///
/// Can be installed once per process.
///
/// # Errors
///
/// Returns [`SimulationError::Interrupt`](crate::SimulationError::Interrupt)
/// if the handler cannot be installed.
pub fn install_interrupt_handler() -> SimulationResult<Receiver<()>> {
    let (tx, rx) = bounded(1);
    ctrlc::set_handler(move || {
        // A full slot means a stop is already pending
        if tx.try_send(()).is_err() {
            tracing::trace!("interrupt already pending");
        }
    })?;
    Ok(rx)
}

/// Blocks until `duration` elapses or `interrupt` fires. Without a duration
/// only the interrupt ends the wait.
#[must_use]
pub fn wait_for_stop(duration: Option<Duration>, interrupt: &Receiver<()>) -> StopReason {
    let deadline = duration.map_or_else(never, after);
    select! {
        recv(interrupt) -> _ => StopReason::Interrupted,
        recv(deadline) -> _ => StopReason::Elapsed,
    }
}
