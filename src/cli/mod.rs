//! CLI module for the sequencer deployment generator.
//!
//! This module provides argument parsing, flag validation and summary
//! formatting for the `sequencer-deploy` binary.

mod commands;
mod output;

pub use commands::{Cli, OutputFormat};
pub use output::OutputFormatter;
