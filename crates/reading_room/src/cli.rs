//! # Command Line
//!
//! Flat flag parsing for the `reading_room` binary. A malformed value never
//! aborts the run: it produces a warning and the setting keeps its default.
//! A negative count or duration is an error.
//!
//! The short positional form `reading_room 10 3 1000 3000 500` fills
//! readers, writers, min hold, max hold and idle in that order.
//!
//! Precedence is defaults, then the `--config` file, then arguments.

use std::path::PathBuf;
use std::str::FromStr;

use crate::config::SimulationConfig;
use crate::error::SimulationResult;

/// Help text for `--help`.
pub const USAGE: &str = "\
Usage: reading_room [OPTIONS] [READERS [WRITERS [MIN_HOLD [MAX_HOLD [IDLE]]]]]

Options:
  -r, --readers <NUM>        Reader actors (default: 10)
  -w, --writers <NUM>        Writer actors (default: 3)
      --min-hold <MS>        Shortest stay inside in ms (default: 1000)
      --max-hold <MS>        Longest stay inside in ms (default: 3000)
      --idle <MS>            Longest pause between visits in ms (default: 500)
      --max-readers <NUM>    Reader seats in the room (default: 5)
      --seed <NUM>           RNG seed (default: clock)
  -c, --config <FILE>        TOML config file, arguments override it
  -d, --duration <SECS>      Run for N seconds then exit (default: until Ctrl+C)
  -h, --help                 Show this help";

/// What the binary should do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run a simulation.
    Run(RunOptions),
    /// Print [`USAGE`] and exit.
    Help,
}

/// Result of parsing the argument list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedArgs {
    /// Chosen command.
    pub command: Command,
    /// Problems that fell back to a default, one line each.
    pub warnings: Vec<String>,
    /// Problems that must stop the binary, one line each.
    pub errors: Vec<String>,
}

/// Argument overrides for a run. `None` keeps the file or default value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// `--config`
    pub config_path: Option<PathBuf>,
    /// `--readers`
    pub readers: Option<usize>,
    /// `--writers`
    pub writers: Option<usize>,
    /// `--min-hold`
    pub min_hold_ms: Option<u64>,
    /// `--max-hold`
    pub max_hold_ms: Option<u64>,
    /// `--idle`
    pub max_idle_ms: Option<u64>,
    /// `--max-readers`
    pub max_readers: Option<usize>,
    /// `--seed`
    pub seed: Option<u64>,
    /// `--duration`
    pub duration_secs: Option<u64>,
}

impl RunOptions {
    /// Loads the config file if one was given, applies the overrides and
    /// validates the result. The file alone is not validated, so an
    /// override can repair it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the final
    /// configuration is invalid.
    pub fn resolve(&self) -> SimulationResult<SimulationConfig> {
        let mut config = match &self.config_path {
            Some(path) => SimulationConfig::read(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(readers) = self.readers {
            config.readers = readers;
        }
        if let Some(writers) = self.writers {
            config.writers = writers;
        }
        if let Some(min_hold_ms) = self.min_hold_ms {
            config.min_hold_ms = min_hold_ms;
        }
        if let Some(max_hold_ms) = self.max_hold_ms {
            config.max_hold_ms = max_hold_ms;
        }
        if let Some(max_idle_ms) = self.max_idle_ms {
            config.max_idle_ms = max_idle_ms;
        }
        if let Some(max_readers) = self.max_readers {
            config.admission.max_readers = max_readers;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.duration_secs.is_some() {
            config.duration_secs = self.duration_secs;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Default)]
struct Diagnostics {
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl Diagnostics {
    fn number<T: FromStr>(&mut self, what: &str, value: Option<String>) -> Option<T> {
        let Some(value) = value else {
            self.warnings.push(format!("{what} needs a value, using default"));
            return None;
        };
        let trimmed = value.trim();
        if let Ok(parsed) = trimmed.parse() {
            return Some(parsed);
        }
        if trimmed.parse::<i64>().is_ok_and(|n| n < 0) {
            self.errors.push(format!("{what} must not be negative, got {trimmed}"));
        } else {
            self.warnings.push(format!("invalid value {value:?} for {what}, using default"));
        }
        None
    }
}

/// Bare values and negative numbers are positional; anything else starting
/// with `-` is a flag.
fn is_positional(arg: &str) -> bool {
    !arg.starts_with('-') || arg.parse::<i64>().is_ok()
}

/// Parses arguments, program name excluded.
#[must_use]
pub fn parse_args(args: impl IntoIterator<Item = String>) -> ParsedArgs {
    let mut options = RunOptions::default();
    let mut diag = Diagnostics::default();
    let mut positional = 0usize;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--readers" | "-r" => options.readers = diag.number(&arg, args.next()),
            "--writers" | "-w" => options.writers = diag.number(&arg, args.next()),
            "--min-hold" => options.min_hold_ms = diag.number(&arg, args.next()),
            "--max-hold" => options.max_hold_ms = diag.number(&arg, args.next()),
            "--idle" => options.max_idle_ms = diag.number(&arg, args.next()),
            "--max-readers" => options.max_readers = diag.number(&arg, args.next()),
            "--seed" => options.seed = diag.number(&arg, args.next()),
            "--duration" | "-d" => options.duration_secs = diag.number(&arg, args.next()),
            "--config" | "-c" => match args.next() {
                Some(path) => options.config_path = Some(PathBuf::from(path)),
                None => diag.warnings.push(format!("{arg} needs a file path, ignoring")),
            },
            "--help" | "-h" => {
                return ParsedArgs {
                    command: Command::Help,
                    warnings: diag.warnings,
                    errors: diag.errors,
                }
            }
            value if is_positional(value) => {
                let value = Some(value.to_owned());
                match positional {
                    0 => options.readers = diag.number("readers", value),
                    1 => options.writers = diag.number("writers", value),
                    2 => options.min_hold_ms = diag.number("min hold", value),
                    3 => options.max_hold_ms = diag.number("max hold", value),
                    4 => options.max_idle_ms = diag.number("idle", value),
                    _ => diag
                        .warnings
                        .push(format!("extra argument {arg:?}, ignoring")),
                }
                positional += 1;
            }
            _ => diag.warnings.push(format!("unknown argument {arg:?}, ignoring")),
        }
    }

    ParsedArgs {
        command: Command::Run(options),
        warnings: diag.warnings,
        errors: diag.errors,
    }
}
