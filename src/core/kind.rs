//! Semantic kinds of expressions and the operation modes they map to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic kind of a raw expression, as decided by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpressionKind {
    /// Contains at least one free variable (`x^2 + 1`).
    Function,
    /// Binds a single-letter variable (`a = 5`).
    Assignment,
    /// Equality between two sides, at least one with a free variable (`x^2 == 4`).
    Equation,
    /// A single numeric literal (`3`, `1/2`, `2.5`, `2+3i`).
    Numeric,
    /// Two-level brace nesting (`{{1,2},{3,4}}`).
    Matrix,
    /// Single-level brace list (`{1,2,3}`).
    Vector,
    /// Comparison between two numeric sides (`2+3 = 5`).
    Boolean,
    /// Non-empty input matching none of the other kinds.
    Unknown,
    /// Empty or whitespace-only input.
    None,
}

impl ExpressionKind {
    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "FUNCTION",
            Self::Assignment => "ASSIGNMENT",
            Self::Equation => "EQUATION",
            Self::Numeric => "NUMERIC",
            Self::Matrix => "MATRIX",
            Self::Vector => "VECTOR",
            Self::Boolean => "BOOLEAN",
            Self::Unknown => "UNKNOWN",
            Self::None => "NONE",
        }
    }

    /// Suggests the operation mode best suited to this kind of expression.
    ///
    /// Free-variable expressions are plotted, bare literals are calculated
    /// numerically, and structured or relational input is evaluated.
    #[must_use]
    pub const fn suggested_mode(self) -> OperationMode {
        match self {
            Self::Function => OperationMode::Drawing,
            Self::Numeric => OperationMode::Calculation,
            Self::Assignment | Self::Equation | Self::Boolean | Self::Matrix | Self::Vector => {
                OperationMode::Evaluation
            }
            Self::Unknown => OperationMode::Unknown,
            Self::None => OperationMode::None,
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation requested of the evaluation facade.
///
/// Selects both the engine call and the shape of the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationMode {
    /// Symbolic evaluation.
    Evaluation,
    /// Numeric calculation with a precision.
    Calculation,
    /// Plot over a domain.
    Drawing,
    /// Mode could not be determined.
    Unknown,
    /// No operation (empty input).
    None,
}

impl OperationMode {
    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Evaluation => "EVALUATION",
            Self::Calculation => "CALCULATION",
            Self::Drawing => "DRAWING",
            Self::Unknown => "UNKNOWN",
            Self::None => "NONE",
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggested_mode() {
        assert_eq!(
            ExpressionKind::Function.suggested_mode(),
            OperationMode::Drawing
        );
        assert_eq!(
            ExpressionKind::Numeric.suggested_mode(),
            OperationMode::Calculation
        );
        assert_eq!(
            ExpressionKind::Matrix.suggested_mode(),
            OperationMode::Evaluation
        );
        assert_eq!(ExpressionKind::None.suggested_mode(), OperationMode::None);
        assert_eq!(
            ExpressionKind::Unknown.suggested_mode(),
            OperationMode::Unknown
        );
    }

    #[test]
    fn test_serialization_names() {
        let json = serde_json::to_string(&ExpressionKind::Assignment).unwrap();
        assert_eq!(json, "\"ASSIGNMENT\"");
        let json = serde_json::to_string(&OperationMode::Calculation).unwrap();
        assert_eq!(json, "\"CALCULATION\"");
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(ExpressionKind::Vector.to_string(), "VECTOR");
        assert_eq!(OperationMode::Drawing.to_string(), "DRAWING");
    }
}
