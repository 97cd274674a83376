//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::{ExpressionKind, OperationMode, Outcome};
use crate::error::{Error, ErrorCategory};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Longest script input echoed back in text output.
const ECHO_LEN: usize = 60;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Structured description of a failed operation.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    /// Coarse error category.
    pub category: ErrorCategory,
    /// Human-readable message.
    pub message: String,
    /// Rejected request field, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    /// Rejected value, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_value: Option<String>,
    /// Engine diagnostics, for computation errors.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<String>,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        let (field, rejected_value, problems) = match err {
            Error::Validation(validation) => (
                Some(validation.field()),
                validation.rejected_value(),
                Vec::new(),
            ),
            Error::Computation(computation) => (None, None, computation.problems.clone()),
            _ => (None, None, Vec::new()),
        };

        Self {
            category: err.category(),
            message: err.to_string(),
            field,
            rejected_value,
            problems,
        }
    }
}

/// What one script line produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryResult {
    /// The line was computed (or assigned).
    Outcome(Outcome),
    /// The line failed.
    Error(ErrorReport),
    /// `:vars` listed the session bindings.
    Bindings(BTreeMap<char, String>),
    /// `:clear` dropped the session bindings.
    Cleared,
}

/// One executed script line.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptEntry {
    /// One-based line number in the input.
    pub line: usize,
    /// The line as written, trimmed.
    pub input: String,
    /// What the line produced.
    pub result: EntryResult,
}

/// Classification of one expression.
#[derive(Debug, Clone, Serialize)]
struct Classification<'a> {
    expression: &'a str,
    kind: ExpressionKind,
    mode: OperationMode,
}

/// Formats a single pipeline outcome.
#[must_use]
pub fn format_outcome(outcome: &Outcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_outcome_text(outcome),
        OutputFormat::Json => format_json(outcome),
    }
}

fn format_outcome_text(outcome: &Outcome) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", outcome.formatted());
    for problem in outcome.result.problems.iter().flatten() {
        let _ = writeln!(output, "  problem: {problem}");
    }
    output
}

/// Formats the kind and suggested mode of an expression.
#[must_use]
pub fn format_classification(
    expression: &str,
    kind: ExpressionKind,
    mode: OperationMode,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Kind:  {kind}");
            let _ = writeln!(output, "Mode:  {mode}");
            output
        }
        OutputFormat::Json => format_json(&Classification {
            expression,
            kind,
            mode,
        }),
    }
}

fn format_bindings_text(bindings: &BTreeMap<char, String>) -> String {
    if bindings.is_empty() {
        return "No variables bound.\n".to_string();
    }

    let mut output = String::new();
    for (name, value) in bindings {
        let _ = writeln!(output, "{name} = {value}");
    }
    output
}

/// Formats the entries produced by a script or batch run.
#[must_use]
pub fn format_entries(entries: &[ScriptEntry], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_entries_text(entries),
        OutputFormat::Json => format_json(&entries),
    }
}

fn format_entries_text(entries: &[ScriptEntry]) -> String {
    let mut output = String::new();
    let failed = entries
        .iter()
        .filter(|entry| matches!(entry.result, EntryResult::Error(_)))
        .count();

    for entry in entries {
        let _ = writeln!(output, "> {}", truncate(&entry.input, ECHO_LEN));
        match &entry.result {
            EntryResult::Outcome(outcome) => output.push_str(&format_outcome_text(outcome)),
            EntryResult::Error(report) => {
                let _ = writeln!(output, "line {}: {}", entry.line, report.message);
                for problem in &report.problems {
                    let _ = writeln!(output, "  problem: {problem}");
                }
            }
            EntryResult::Bindings(bindings) => output.push_str(&format_bindings_text(bindings)),
            EntryResult::Cleared => output.push_str("Variables cleared.\n"),
        }
    }

    if failed > 0 {
        let _ = writeln!(output, "\n{failed} of {} lines failed", entries.len());
    }
    output
}

/// Formats an error for display.
///
/// Text output is the message followed by any engine diagnostics; JSON
/// output is an [`ErrorReport`] wrapped in an `error` object.
#[must_use]
pub fn format_error(err: &Error, format: OutputFormat) -> String {
    let report = ErrorReport::from(err);
    match format {
        OutputFormat::Text => {
            let mut output = report.message;
            for problem in &report.problems {
                let _ = write!(output, "\n  problem: {problem}");
            }
            output
        }
        OutputFormat::Json => format_json(&serde_json::json!({ "error": report })),
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Truncates a string to max characters with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}
