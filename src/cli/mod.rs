//! CLI layer for mathgate.
//!
//! Provides the command-line interface using clap, with commands for
//! evaluating, calculating, plotting and classifying expressions, and for
//! running scripts through one session.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::{execute, execute_with};
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
