//! # Reading Room
//!
//! Reader and writer actors contending for one [`AdmissionLock`], with a
//! live status feed of every state change.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  acquire/release  ┌─────────────────┐  RoomEvent  ┌───────────────┐
//! │ Reader-1..R│──────────────────>│  AdmissionLock  │────────────>│ StatusPrinter │
//! │ Writer-1..W│<──── wake ────────│  (FIFO queue)   │  (bounded)  │   (stdout)    │
//! └─────┬──────┘                   └─────────────────┘             └───────────────┘
//!       │ stop token
//! ┌─────┴──────┐
//! │ Simulation │
//! └────────────┘
//! ```
//!
//! ## Modules
//!
//! - `actor`: One thread per reader or writer
//! - `simulation`: Spawns the actors and stops them
//! - `status`: Renders lock events
//! - `shutdown`: Ctrl+C and run deadline
//! - `cli`: Argument parsing for the binary
//! - `config`: TOML configuration

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod actor;
pub mod cli;
pub mod config;
pub mod error;
pub mod shutdown;
pub mod simulation;
pub mod status;

pub use reading_room_core as core;

pub use actor::{ActorConfig, ActorHandle, ActorReport};
pub use config::SimulationConfig;
pub use error::{SimulationError, SimulationResult};
pub use reading_room_core::AdmissionLock;
pub use shutdown::StopReason;
pub use simulation::{Simulation, SimulationReport};
pub use status::StatusPrinter;
