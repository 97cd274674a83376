//! Engine results and pipeline outcomes.

use crate::core::{ExpressionKind, OperationMode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result produced by the computation engine.
///
/// Immutable once produced; cache hits share the same allocation.
///
/// # Examples
///
/// ```
/// use mathgate::core::EvaluationResult;
///
/// let result = EvaluationResult::new("4").with_problems(vec!["rounded".to_string()]);
/// assert_eq!(result.formatted, "4");
/// assert!(result.has_problems());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Formatted result text.
    pub formatted: String,

    /// Diagnostic problems reported by the engine, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problems: Option<Vec<String>>,
}

impl EvaluationResult {
    /// Creates a result without diagnostics.
    pub fn new(formatted: impl Into<String>) -> Self {
        Self {
            formatted: formatted.into(),
            problems: None,
        }
    }

    /// Attaches diagnostic problems. An empty list is stored as `None`.
    #[must_use]
    pub fn with_problems(mut self, problems: Vec<String>) -> Self {
        self.problems = if problems.is_empty() {
            None
        } else {
            Some(problems)
        };
        self
    }

    /// Returns `true` if the engine reported at least one problem.
    #[must_use]
    pub fn has_problems(&self) -> bool {
        self.problems.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Where an [`Outcome`]'s result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    /// The input was an assignment; no computation happened.
    Assignment,
    /// Served from the shared result cache.
    Cache,
    /// Freshly computed by the engine.
    Engine,
}

/// Outcome of one pass through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Expression after variable substitution (or the canonical assignment).
    pub expression: String,

    /// Kind of the raw input.
    pub kind: ExpressionKind,

    /// Operation that produced the result.
    pub mode: OperationMode,

    /// The result itself.
    pub result: Arc<EvaluationResult>,

    /// Where the result came from.
    pub source: ResultSource,
}

impl Outcome {
    /// Returns the formatted result text.
    #[must_use]
    pub fn formatted(&self) -> &str {
        &self.result.formatted
    }
}
