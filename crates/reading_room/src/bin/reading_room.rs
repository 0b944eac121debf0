//! # Reading Room Simulation
//!
//! Runs readers and writers against one reading room and prints the room
//! after every change.
//!
//! ## Usage
//!
//! ```bash
//! reading_room --readers 10 --writers 3 --max-readers 5 --duration 30
//! ```
//!
//! Ctrl+C stops every actor, waits for them and prints the report.

use std::io;
use std::process;
use std::time::Duration;

use crossbeam_channel::{bounded, never};
use reading_room::cli::{self, Command, USAGE};
use reading_room::shutdown::{self, StopReason};
use reading_room::{Simulation, SimulationConfig, SimulationResult, StatusPrinter};

fn main() {
    let parsed = cli::parse_args(std::env::args().skip(1));
    for warning in &parsed.warnings {
        eprintln!("warning: {warning}");
    }
    if !parsed.errors.is_empty() {
        for error in &parsed.errors {
            eprintln!("error: {error}");
        }
        process::exit(1);
    }

    let options = match parsed.command {
        Command::Help => {
            println!("{USAGE}");
            return;
        }
        Command::Run(options) => options,
    };

    let config = match options.resolve() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };

    if let Err(err) = run(&config) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(config: &SimulationConfig) -> SimulationResult<()> {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         READING ROOM                                             ║");
    println!("║         BOUNDED READERS, EXCLUSIVE WRITERS, FIFO QUEUE           ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();
    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Readers:            {}", config.readers);
    println!("│ Writers:            {}", config.writers);
    println!("│ Reader Seats:       {}", config.admission.max_readers);
    println!("│ Hold Time:          {}-{} ms", config.min_hold_ms, config.max_hold_ms);
    println!("│ Idle Time:          < {} ms", config.max_idle_ms);
    match config.duration_secs {
        Some(secs) => println!("│ Duration:           {secs} seconds"),
        None => println!("│ Duration:           until Ctrl+C"),
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    let interrupt = shutdown::install_interrupt_handler().unwrap_or_else(|err| {
        eprintln!("warning: {err}");
        never()
    });

    let (events_tx, events_rx) = bounded(config.observer_capacity);
    let printer = StatusPrinter::spawn(events_rx, io::stdout())?;
    let simulation = Simulation::start(config, Some(events_tx))?;

    let duration = config.duration_secs.map(Duration::from_secs);
    if shutdown::wait_for_stop(duration, &interrupt) == StopReason::Interrupted {
        println!();
        println!("Stopping actors...");
    }

    let report = simulation.stop()?;
    // The lock, and with it the last event sender, went away with the simulation
    let (_, printed) = printer.join()?;

    println!();
    println!("{report}");
    println!("Events printed: {printed}");
    println!("Simulation finished.");
    Ok(())
}
