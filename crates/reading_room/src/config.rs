//! # Simulation Configuration
//!
//! Loaded once at startup from TOML. Every key is optional:
//!
//! ```toml
//! readers = 10
//! writers = 3
//! min_hold_ms = 1000
//! max_hold_ms = 3000
//! max_idle_ms = 500
//! seed = 42
//! duration_secs = 30
//!
//! [admission]
//! max_readers = 5
//! ```

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use reading_room_core::AdmissionConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulationResult};

/// Default number of reader actors.
pub const DEFAULT_READERS: usize = 10;
/// Default number of writer actors.
pub const DEFAULT_WRITERS: usize = 3;
/// Default minimum hold time (ms).
pub const DEFAULT_MIN_HOLD_MS: u64 = 1000;
/// Default maximum hold time (ms).
pub const DEFAULT_MAX_HOLD_MS: u64 = 3000;
/// Default maximum idle time between visits (ms).
pub const DEFAULT_MAX_IDLE_MS: u64 = 500;
/// Default capacity of the status event channel.
pub const DEFAULT_OBSERVER_CAPACITY: usize = 1024;

/// Configuration for a [`Simulation`](crate::Simulation).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of reader actors.
    pub readers: usize,
    /// Number of writer actors.
    pub writers: usize,
    /// Shortest time an actor stays inside (ms).
    pub min_hold_ms: u64,
    /// Longest time an actor stays inside (ms).
    pub max_hold_ms: u64,
    /// Upper bound (exclusive) on idle time between visits (ms). Zero disables idling.
    pub max_idle_ms: u64,
    /// Base RNG seed. Taken from the clock when absent.
    pub seed: Option<u64>,
    /// How long the binary runs. Runs until killed when absent.
    pub duration_secs: Option<u64>,
    /// Capacity of the status event channel.
    pub observer_capacity: usize,
    /// Lock configuration.
    pub admission: AdmissionConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            readers: DEFAULT_READERS,
            writers: DEFAULT_WRITERS,
            min_hold_ms: DEFAULT_MIN_HOLD_MS,
            max_hold_ms: DEFAULT_MAX_HOLD_MS,
            max_idle_ms: DEFAULT_MAX_IDLE_MS,
            seed: None,
            duration_secs: None,
            observer_capacity: DEFAULT_OBSERVER_CAPACITY,
            admission: AdmissionConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Parse`] for malformed TOML and
    /// [`SimulationError::InvalidConfig`] / [`SimulationError::Admission`]
    /// for values that fail validation.
    pub fn from_toml_str(source: &str) -> SimulationResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Io`] if the file cannot be read, otherwise
    /// the errors of [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> SimulationResult<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file without validating it, for callers that
    /// apply overrides first.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Io`] or [`SimulationError::Parse`].
    pub fn read(path: impl AsRef<Path>) -> SimulationResult<Self> {
        let source = fs::read_to_string(path)?;
        Ok(toml::from_str(&source)?)
    }

    /// Checks that the values describe a runnable simulation.
    ///
    /// # Errors
    ///
    /// Returns an error if the hold range is inverted, the observer channel
    /// has no capacity, or the lock configuration is invalid.
    pub fn validate(&self) -> SimulationResult<()> {
        if self.min_hold_ms > self.max_hold_ms {
            return Err(SimulationError::InvalidConfig(format!(
                "min_hold_ms ({}) is greater than max_hold_ms ({})",
                self.min_hold_ms, self.max_hold_ms
            )));
        }
        if self.observer_capacity == 0 {
            return Err(SimulationError::InvalidConfig(
                "observer_capacity must be at least 1".to_owned(),
            ));
        }
        self.admission.validate()?;
        Ok(())
    }

    /// The configured seed, or one derived from the wall clock.
    #[must_use]
    pub fn seed_or_clock(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |elapsed| elapsed.as_nanos() as u64)
        })
    }
}
