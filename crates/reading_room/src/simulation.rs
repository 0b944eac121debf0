//! # Simulation
//!
//! Owns one [`AdmissionLock`] and the actor threads contending for it.
//! Readers are spawned first (`Reader-1..R`), then writers (`Writer-1..W`).
//! Every actor shares the same stop token, so [`Simulation::stop`] unblocks
//! queued waiters and interrupts holds and idles alike.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use reading_room_core::{AdmissionLock, CancelSource, Role, RoomEvent};

use crate::actor::{self, ActorConfig, ActorHandle, ActorReport};
use crate::config::SimulationConfig;
use crate::error::SimulationResult;

/// A running set of actors around one reading room.
#[derive(Debug)]
pub struct Simulation {
    lock: Arc<AdmissionLock>,
    stop: CancelSource,
    actors: Vec<ActorHandle>,
    started: Instant,
}

impl Simulation {
    /// Builds the lock and spawns every actor.
    ///
    /// Events go to `observer` when one is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or a thread fails to spawn.
    /// Actors already running are stopped and joined before returning.
    pub fn start(
        config: &SimulationConfig,
        observer: Option<Sender<RoomEvent>>,
    ) -> SimulationResult<Self> {
        config.validate()?;

        let mut lock = AdmissionLock::from_config(config.admission)?;
        if let Some(observer) = observer {
            lock = lock.with_observer(observer);
        }

        let mut simulation = Self {
            lock: Arc::new(lock),
            stop: CancelSource::new(),
            actors: Vec::with_capacity(config.readers + config.writers),
            started: Instant::now(),
        };

        let base_seed = config.seed_or_clock();
        let roster = (1..=config.readers)
            .map(|i| (format!("Reader-{i}"), Role::Reader))
            .chain((1..=config.writers).map(|i| (format!("Writer-{i}"), Role::Writer)));

        for (index, (name, role)) in roster.enumerate() {
            let actor_config = ActorConfig::new(name, role)
                .with_hold(config.min_hold_ms, config.max_hold_ms)
                .with_idle(config.max_idle_ms)
                .with_seed(base_seed ^ index as u64);

            match actor::spawn(Arc::clone(&simulation.lock), actor_config, simulation.stop.token()) {
                Ok(handle) => simulation.actors.push(handle),
                Err(err) => {
                    tracing::error!("Failed to spawn actor: {err}");
                    // Best effort; the spawn error is the one worth reporting
                    let _ = simulation.stop();
                    return Err(err);
                }
            }
        }

        tracing::info!(
            "Simulation started: {} readers, {} writers, {} seats, seed {base_seed}",
            config.readers,
            config.writers,
            simulation.lock.max_readers(),
        );

        Ok(simulation)
    }

    /// The shared lock.
    #[must_use]
    pub fn lock(&self) -> &Arc<AdmissionLock> {
        &self.lock
    }

    /// Number of running actors.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Time since the simulation started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Signals every actor to stop and joins them.
    ///
    /// # Errors
    ///
    /// Returns the first actor panic. Remaining actors are still joined.
    pub fn stop(self) -> SimulationResult<SimulationReport> {
        self.stop.cancel();

        let mut reports = Vec::with_capacity(self.actors.len());
        let mut first_error = None;
        for handle in self.actors {
            match handle.join() {
                Ok(report) => reports.push(report),
                Err(err) => {
                    tracing::error!("{err}");
                    first_error.get_or_insert(err);
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        let report = SimulationReport {
            actors: reports,
            elapsed: self.started.elapsed(),
        };
        tracing::info!(
            "Simulation stopped after {:.1}s: {} admissions",
            report.elapsed.as_secs_f64(),
            report.total_admissions()
        );
        Ok(report)
    }
}

/// Per-actor results of a finished simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationReport {
    /// One entry per actor, readers first.
    pub actors: Vec<ActorReport>,
    /// Wall time from start to stop.
    pub elapsed: Duration,
}

impl SimulationReport {
    /// Sum of admissions across all actors.
    #[must_use]
    pub fn total_admissions(&self) -> u64 {
        self.actors.iter().map(|a| a.admissions).sum()
    }

    /// Sum of admissions for one role.
    #[must_use]
    pub fn admissions_for(&self, role: Role) -> u64 {
        self.actors
            .iter()
            .filter(|a| a.role == role)
            .map(|a| a.admissions)
            .sum()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌─ SIMULATION REPORT ──────────────────────────────────────────────┐")?;
        writeln!(f, "│ Elapsed:            {:.1}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "│ Reader visits:      {}", self.admissions_for(Role::Reader))?;
        writeln!(f, "│ Writer visits:      {}", self.admissions_for(Role::Writer))?;
        writeln!(f, "├──────────────────────────────────────────────────────────────────┤")?;
        for actor in &self.actors {
            writeln!(f, "│ {actor}")?;
        }
        write!(f, "└──────────────────────────────────────────────────────────────────┘")
    }
}
