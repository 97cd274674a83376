//! # mathgate
//!
//! Expression pre-processing and cached evaluation in front of a
//! computer-algebra engine.
//!
//! Every request is validated, run through the session's assignment memory
//! (`a = 5` binds, later expressions get `a` substituted) and answered from a
//! shared cache keyed by the operation and its parameters. The engine is
//! called at most once per distinct key, even under concurrent requests.
//!
//! ## Features
//!
//! - **Classification**: total mapping of any input to an [`ExpressionKind`]
//! - **Validation**: alphabet, nesting, precision and plot domain checks
//! - **Single-flight cache**: concurrent misses on one key share one engine call
//! - **Sessions**: isolated per-session variable bindings
//! - **Process engine**: any external program speaking a simple argv protocol

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod session;
pub mod validate;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorCategory, Result};

// Re-export core domain types
pub use core::{EvaluationResult, ExpressionKind, OperationMode, Outcome, ResultSource};

// Re-export pipeline types
pub use cache::{CacheKey, CacheStats, ResultCache};
pub use classify::{classify, suggest};
pub use config::Settings;
pub use engine::{Cas, CasResult, ProcessCas};
pub use evaluator::{CachedEvaluator, Request};
pub use session::{AssignmentMemory, SessionStore};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
