//! Command-line interface
//!
//! One binary per target ecosystem; all three share this argument surface
//! and runner.

mod commands;

pub use commands::{run, run_target, Cli, CliError};
