//! # Cooperative Cancellation
//!
//! A blocked acquire is unblocked by cancelling its token rather than by
//! interrupting the thread.
//!
//! ```text
//!   CancelSource ──(drops Sender)──> channel DISCONNECTED
//!                                        │
//!              ┌─────────────────────────┼────────────────────────┐
//!              ▼                         ▼                        ▼
//!        CancelToken               CancelToken              CancelToken
//!     (blocked acquire)          (sleeping actor)          (polling loop)
//! ```
//!
//! Disconnection is observed by every receiver at once and never resets,
//! which makes it a one-way, broadcast cancellation flag that can also be
//! waited on inside `select!`.

use std::time::Duration;

use crossbeam_channel::{bounded, never, Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;

/// Owner side of a cancellation signal.
///
/// Hands out any number of [`CancelToken`]s. Cancelling the source (or
/// dropping it) cancels all of them.
#[derive(Debug)]
pub struct CancelSource {
    trigger: Mutex<Option<Sender<()>>>,
    token: CancelToken,
}

impl CancelSource {
    /// Creates a source that has not been cancelled yet.
    #[must_use]
    pub fn new() -> Self {
        // Nothing is ever sent: only the disconnect carries information.
        let (sender, receiver) = bounded(0);
        Self {
            trigger: Mutex::new(Some(sender)),
            token: CancelToken { receiver },
        }
    }

    /// Returns a token tied to this source.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Cancels every token of this source. Idempotent.
    pub fn cancel(&self) {
        drop(self.trigger.lock().take());
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Waiter side of a cancellation signal.
#[derive(Clone, Debug)]
pub struct CancelToken {
    receiver: Receiver<()>,
}

impl CancelToken {
    /// A token that is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        Self { receiver: never() }
    }

    /// Returns true if the owning source has been cancelled.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.receiver.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Sleeps for up to `timeout`, waking early on cancellation.
    ///
    /// Returns true if the token was cancelled before the timeout elapsed.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        !matches!(
            self.receiver.recv_timeout(timeout),
            Err(RecvTimeoutError::Timeout)
        )
    }

    /// Receiver that becomes ready (disconnected) on cancellation.
    pub(crate) fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }
}
