//! # Simulation Error Types

use reading_room_core::AdmissionError;
use thiserror::Error;

/// Errors that can occur while configuring or running a simulation.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Configuration values that cannot produce a working simulation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading a config file or spawning a thread failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The admission lock rejected its configuration.
    #[error(transparent)]
    Admission(#[from] AdmissionError),

    /// The Ctrl+C handler could not be installed.
    #[error("failed to install interrupt handler: {0}")]
    Interrupt(#[from] ctrlc::Error),

    /// A simulation thread panicked instead of returning.
    #[error("thread {0} panicked")]
    ThreadPanicked(String),
}

/// Result type for simulation operations.
pub type SimulationResult<T> = Result<T, SimulationError>;
