//! Error types for mathgate operations.
//!
//! This module provides the error hierarchy using `thiserror` for the
//! evaluation pipeline (validation, computation, internal failures) and for
//! the surrounding CLI layer (configuration, commands, I/O).

use serde::Serialize;
use thiserror::Error;

/// Result type alias for mathgate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for mathgate operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The caller's input was rejected before any computation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The computation engine failed to produce a result.
    #[error("computation error: {0}")]
    Computation(#[from] ComputationError),

    /// Unexpected failure inside the pipeline itself.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// I/O errors (script files, standard streams).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

/// Coarse classification of an [`Error`] as seen by callers of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// The input is wrong; fix it and resubmit.
    Validation,
    /// The engine failed; retrying may succeed.
    Computation,
    /// The system is broken.
    Internal,
}

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Computation(_) => ErrorCategory::Computation,
            Self::Internal { .. } | Self::Config { .. } | Self::Command(_) | Self::Io(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Creates an internal error from any displayable message and logs it.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(%message, "internal error");
        Self::Internal { message }
    }
}

/// Structural validation failures, reported before any cache lookup or
/// engine call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Expression is empty after trimming.
    #[error("expression must not be empty")]
    EmptyExpression,

    /// Braces, brackets or parentheses do not nest properly.
    #[error("unbalanced delimiters near '{fragment}'")]
    UnbalancedDelimiters {
        /// Fragment of the expression starting at the offending delimiter.
        fragment: String,
    },

    /// Expression contains a character outside the accepted alphabet.
    #[error("disallowed character '{}' in '{fragment}'", .character.escape_default())]
    DisallowedCharacter {
        /// The rejected character.
        character: char,
        /// Fragment of the expression starting at the rejected character.
        fragment: String,
    },

    /// Requested precision is negative or above the configured maximum.
    #[error("decimals must be between 0 and {max}, got {value}")]
    DecimalsOutOfRange {
        /// Rejected precision.
        value: i64,
        /// Configured maximum precision.
        max: u32,
    },

    /// A plot bound does not parse as a finite real number.
    #[error("{field} is not a real number: '{value}'")]
    NotANumber {
        /// Name of the field (`origin` or `bound`).
        field: &'static str,
        /// Rejected text.
        value: String,
    },

    /// Origin is not strictly less than bound.
    #[error("origin {origin} must be less than bound {bound}")]
    EmptyDomain {
        /// Rejected origin.
        origin: String,
        /// Rejected bound.
        bound: String,
    },
}

impl ValidationError {
    /// Returns the name of the request field that was rejected.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyExpression
            | Self::UnbalancedDelimiters { .. }
            | Self::DisallowedCharacter { .. } => "expression",
            Self::DecimalsOutOfRange { .. } => "decimals",
            Self::NotANumber { field, .. } => *field,
            Self::EmptyDomain { .. } => "origin",
        }
    }

    /// Returns the rejected value, if the failure is tied to one.
    #[must_use]
    pub fn rejected_value(&self) -> Option<String> {
        match self {
            Self::EmptyExpression => None,
            Self::UnbalancedDelimiters { fragment } | Self::DisallowedCharacter { fragment, .. } => {
                Some(fragment.clone())
            }
            Self::DecimalsOutOfRange { value, .. } => Some(value.to_string()),
            Self::NotANumber { value, .. } => Some(value.clone()),
            Self::EmptyDomain { origin, bound } => Some(format!("{origin}..{bound}")),
        }
    }
}

/// Failure reported by the computation engine.
///
/// Never cached: a later request for the same key calls the engine again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{cause}")]
pub struct ComputationError {
    /// Human-readable cause.
    pub cause: String,
    /// Diagnostic problems reported alongside the failure.
    pub problems: Vec<String>,
}

impl ComputationError {
    /// Creates a computation error without diagnostics.
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
            problems: Vec::new(),
        }
    }

    /// Attaches diagnostic problems.
    #[must_use]
    pub fn with_problems(mut self, problems: Vec<String>) -> Self {
        self.problems = problems;
        self
    }
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed script directive. The line number is reported by the
    /// script entry, not by this message.
    #[error("{reason}")]
    InvalidDirective {
        /// One-based line number in the script.
        line: usize,
        /// Reason the directive was rejected.
        reason: String,
    },
}

/// I/O-specific errors.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::internal(format!("lock poisoned: {err}"))
    }
}
