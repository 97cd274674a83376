//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::config::{DEFAULT_MAX_DECIMALS, DEFAULT_PLOT_VARIABLE, Settings};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default precision for `calc` when none is given.
pub const DEFAULT_DECIMALS: &str = "10";

/// mathgate: validated, cached evaluation in front of a computer-algebra engine.
///
/// Expressions are checked, variables bound with `a = ...` are substituted,
/// and each distinct computation is sent to the engine only once.
#[derive(Parser, Debug)]
#[command(name = "mathgate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Engine program invoked as `<engine> [engine-args...] <operation> <operands...>`.
    #[arg(short, long, env = "MATHGATE_ENGINE", global = true)]
    pub engine: Option<String>,

    /// Leading argument passed to the engine program (repeatable).
    #[arg(long = "engine-arg", global = true, allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Largest precision accepted by `calc`.
    #[arg(long, env = "MATHGATE_MAX_DECIMALS", default_value_t = DEFAULT_MAX_DECIMALS, global = true)]
    pub max_decimals: u32,

    /// Maximum number of cached results (unbounded if omitted).
    #[arg(long, env = "MATHGATE_CACHE_CAPACITY", global = true)]
    pub cache_capacity: Option<usize>,

    /// Variable passed to the engine when plotting.
    #[arg(long, env = "MATHGATE_PLOT_VARIABLE", default_value = DEFAULT_PLOT_VARIABLE, global = true)]
    pub plot_variable: String,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate an expression symbolically.
    #[command(name = "eval")]
    Evaluate {
        /// Expression to evaluate.
        #[arg(allow_hyphen_values = true)]
        expression: String,

        /// Bind a variable first, e.g. `--let a=5` (repeatable).
        #[arg(short = 'l', long = "let")]
        bindings: Vec<String>,
    },

    /// Calculate an expression numerically.
    #[command(name = "calc")]
    Calculate {
        /// Expression to calculate.
        #[arg(allow_hyphen_values = true)]
        expression: String,

        /// Digits of precision.
        #[arg(short, long, default_value = DEFAULT_DECIMALS, allow_negative_numbers = true)]
        decimals: i64,

        /// Bind a variable first, e.g. `--let a=5` (repeatable).
        #[arg(short = 'l', long = "let")]
        bindings: Vec<String>,
    },

    /// Plot an expression over a domain.
    Draw {
        /// Expression to plot.
        #[arg(allow_hyphen_values = true)]
        expression: String,

        /// Lower end of the domain.
        #[arg(long, allow_hyphen_values = true)]
        origin: String,

        /// Upper end of the domain.
        #[arg(long, allow_hyphen_values = true)]
        bound: String,

        /// Bind a variable first, e.g. `--let a=5` (repeatable).
        #[arg(short = 'l', long = "let")]
        bindings: Vec<String>,
    },

    /// Show the kind of an expression and the suggested operation.
    Classify {
        /// Expression to classify.
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },

    /// Run a script line by line in one session.
    ///
    /// Lines are evaluated in order. Directives: `:calc <decimals> <expr>`,
    /// `:draw <origin> <bound> <expr>`, `:eval <expr>`, `:vars`, `:clear`.
    /// Blank lines and lines starting with `#` are skipped.
    Run {
        /// Script file (stdin if omitted or `-`).
        file: Option<PathBuf>,
    },

    /// Evaluate every line of a file, computing in parallel.
    ///
    /// Assignments still apply in file order.
    Batch {
        /// File with one expression per line.
        file: PathBuf,
    },
}

impl Cli {
    /// Builds evaluator settings from the global flags.
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings::default()
            .with_max_decimals(self.max_decimals)
            .with_cache_capacity(self.cache_capacity)
            .with_plot_variable(self.plot_variable.clone())
    }
}
