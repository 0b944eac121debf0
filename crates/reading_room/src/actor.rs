//! # Reader and Writer Actors
//!
//! Each actor is an OS thread running the visit cycle until stopped:
//!
//! ```text
//!   ┌──> acquire (blocks in the queue) ──> hold ──> release ──> idle ──┐
//!   └──────────────────────────────────────────────────────────────────┘
//!        │ cancelled              │ cancelled                │ cancelled
//!        ▼                        ▼ (releases first)         ▼
//!      stop                     stop                       stop
//! ```
//!
//! Hold and idle are interruptible sleeps on the same cancel token that
//! unblocks a queued acquire, so a stop request never waits out a visit.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reading_room_core::{AdmissionLock, CancelToken, Role};

use crate::config::{DEFAULT_MAX_HOLD_MS, DEFAULT_MAX_IDLE_MS, DEFAULT_MIN_HOLD_MS};
use crate::error::{SimulationError, SimulationResult};

/// Parameters for one actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorConfig {
    /// Name the actor queues under.
    pub name: String,
    /// Reader or writer.
    pub role: Role,
    /// Shortest stay inside (ms).
    pub min_hold_ms: u64,
    /// Longest stay inside (ms).
    pub max_hold_ms: u64,
    /// Upper bound (exclusive) on idle time (ms). Zero disables idling.
    pub max_idle_ms: u64,
    /// RNG seed for hold and idle durations.
    pub seed: u64,
}

impl ActorConfig {
    /// Creates an actor config with default timings.
    #[must_use]
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
            min_hold_ms: DEFAULT_MIN_HOLD_MS,
            max_hold_ms: DEFAULT_MAX_HOLD_MS,
            max_idle_ms: DEFAULT_MAX_IDLE_MS,
            seed: 0,
        }
    }

    /// Sets the hold range (ms).
    #[must_use]
    pub fn with_hold(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_hold_ms = min_ms;
        self.max_hold_ms = max_ms;
        self
    }

    /// Sets the idle bound (ms).
    #[must_use]
    pub fn with_idle(mut self, max_ms: u64) -> Self {
        self.max_idle_ms = max_ms;
        self
    }

    /// Sets the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn hold(&self, rng: &mut StdRng) -> Duration {
        let millis = if self.min_hold_ms >= self.max_hold_ms {
            self.min_hold_ms
        } else {
            rng.gen_range(self.min_hold_ms..=self.max_hold_ms)
        };
        Duration::from_millis(millis)
    }

    fn idle(&self, rng: &mut StdRng) -> Option<Duration> {
        (self.max_idle_ms > 0).then(|| Duration::from_millis(rng.gen_range(0..self.max_idle_ms)))
    }
}

/// What an actor did before it stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorReport {
    /// Actor name.
    pub name: String,
    /// Actor role.
    pub role: Role,
    /// Completed admissions.
    pub admissions: u64,
}

impl fmt::Display for ActorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<16} {:<7} {:>6} visits", self.name, self.role, self.admissions)
    }
}

/// Handle to a running actor thread.
#[derive(Debug)]
pub struct ActorHandle {
    name: String,
    thread: JoinHandle<ActorReport>,
}

impl ActorHandle {
    /// Actor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the actor to stop.
    ///
    /// Only returns once the actor's token has been cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ThreadPanicked`] if the actor panicked.
    pub fn join(self) -> SimulationResult<ActorReport> {
        self.thread
            .join()
            .map_err(|_| SimulationError::ThreadPanicked(self.name))
    }
}

/// Starts an actor on its own named thread.
///
/// # Errors
///
/// Returns [`SimulationError::Io`] if the thread cannot be spawned.
pub fn spawn(
    lock: Arc<AdmissionLock>,
    config: ActorConfig,
    cancel: CancelToken,
) -> SimulationResult<ActorHandle> {
    let name = config.name.clone();
    let thread = thread::Builder::new()
        .name(name.clone())
        .spawn(move || run(&lock, &config, &cancel))?;
    Ok(ActorHandle { name, thread })
}

fn run(lock: &AdmissionLock, config: &ActorConfig, cancel: &CancelToken) -> ActorReport {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut admissions = 0u64;

    while !cancel.is_cancelled() {
        let entered = match config.role {
            Role::Reader => lock.acquire_read(&config.name, cancel),
            Role::Writer => lock.acquire_write(&config.name, cancel),
        };
        if let Err(err) = entered {
            debug_assert!(err.is_cancelled(), "unexpected admission error: {err}");
            break;
        }
        admissions += 1;

        let interrupted = cancel.wait_timeout(config.hold(&mut rng));

        match config.role {
            Role::Reader => lock.release_read(&config.name),
            Role::Writer => lock.release_write(&config.name),
        }

        if interrupted {
            break;
        }
        if let Some(idle) = config.idle(&mut rng) {
            if cancel.wait_timeout(idle) {
                break;
            }
        }
    }

    tracing::debug!("{} ({}) stopped after {admissions} visits", config.name, config.role);

    ActorReport {
        name: config.name.clone(),
        role: config.role,
        admissions,
    }
}
