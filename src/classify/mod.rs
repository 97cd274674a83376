//! Expression classification.
//!
//! Maps a raw expression string to one [`ExpressionKind`]. Classification is
//! total: every string, however malformed, yields a kind. Rules are tried in
//! order on the whitespace-normalized text and the first match wins:
//!
//! 1. `<letter>=<rest>` with no other `=` is an assignment
//! 2. a `==` with a free variable on either side is an equation
//! 3. a comparison between two numeric sides is a boolean
//! 4. `{{..},{..}}` is a matrix, `{..}` a vector
//! 5. any free variable makes a function
//! 6. a single literal is numeric
//! 7. anything else is unknown

pub mod lexical;

pub use lexical::{
    CONSTANTS, Comparison, FUNCTIONS, has_free_variable, is_known_name, is_numeric_literal,
    is_numeric_side, normalize, parse_assignment, split_comparison,
};

use crate::core::{ExpressionKind, OperationMode};

/// Classifies a raw expression.
///
/// # Examples
///
/// ```
/// use mathgate::classify::classify;
/// use mathgate::core::ExpressionKind;
///
/// assert_eq!(classify("a = 5"), ExpressionKind::Assignment);
/// assert_eq!(classify("x^2 == 4"), ExpressionKind::Equation);
/// assert_eq!(classify("{{1,2},{3,4}}"), ExpressionKind::Matrix);
/// assert_eq!(classify("sin(x)"), ExpressionKind::Function);
/// assert_eq!(classify("1/2"), ExpressionKind::Numeric);
/// assert_eq!(classify("   "), ExpressionKind::None);
/// ```
#[must_use]
pub fn classify(raw: &str) -> ExpressionKind {
    let text = normalize(raw);

    if text.is_empty() {
        return ExpressionKind::None;
    }

    if parse_assignment(&text).is_some() {
        return ExpressionKind::Assignment;
    }

    if let Some(kind) = classify_comparison(&text) {
        return kind;
    }

    if let Some(kind) = classify_braces(&text) {
        return kind;
    }

    if has_free_variable(&text) {
        return ExpressionKind::Function;
    }

    if is_numeric_literal(&text) {
        return ExpressionKind::Numeric;
    }

    ExpressionKind::Unknown
}

/// Classifies a raw expression and suggests the operation mode for it.
///
/// # Examples
///
/// ```
/// use mathgate::classify::suggest;
/// use mathgate::core::{ExpressionKind, OperationMode};
///
/// assert_eq!(suggest("x^2"), (ExpressionKind::Function, OperationMode::Drawing));
/// assert_eq!(suggest("22/7"), (ExpressionKind::Numeric, OperationMode::Calculation));
/// ```
#[must_use]
pub fn suggest(raw: &str) -> (ExpressionKind, OperationMode) {
    let kind = classify(raw);
    (kind, kind.suggested_mode())
}

fn classify_comparison(text: &str) -> Option<ExpressionKind> {
    let Comparison { lhs, op, rhs } = split_comparison(text)?;

    if lhs.is_empty() || rhs.is_empty() {
        return None;
    }

    if op == "==" && (has_free_variable(lhs) || has_free_variable(rhs)) {
        return Some(ExpressionKind::Equation);
    }

    if is_numeric_side(lhs) && is_numeric_side(rhs) {
        return Some(ExpressionKind::Boolean);
    }

    None
}

fn classify_braces(text: &str) -> Option<ExpressionKind> {
    let inner = text.strip_prefix('{')?.strip_suffix('}')?;

    if inner.starts_with('{') && inner.ends_with('}') {
        return Some(ExpressionKind::Matrix);
    }

    if !inner.contains(['{', '}']) {
        return Some(ExpressionKind::Vector);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("a=5", ExpressionKind::Assignment ; "simple assignment")]
    #[test_case(" b = x ^ 2 ", ExpressionKind::Assignment ; "assignment with spaces")]
    #[test_case("x^2==4", ExpressionKind::Equation ; "equation lhs variable")]
    #[test_case("4==sin(y)", ExpressionKind::Equation ; "equation rhs variable")]
    #[test_case("2+3=5", ExpressionKind::Boolean ; "numeric equality")]
    #[test_case("2==2", ExpressionKind::Boolean ; "numeric double equality")]
    #[test_case("3 < 4", ExpressionKind::Boolean ; "numeric less than")]
    #[test_case("{{1,2},{3,4}}", ExpressionKind::Matrix ; "matrix")]
    #[test_case("{1, 2, 3}", ExpressionKind::Vector ; "vector")]
    #[test_case("{x, y}", ExpressionKind::Vector ; "vector of variables")]
    #[test_case("x+1", ExpressionKind::Function ; "polynomial")]
    #[test_case("sin(t)*cos(t)", ExpressionKind::Function ; "trig function")]
    #[test_case("x+1=3", ExpressionKind::Function ; "single equals with variable lhs")]
    #[test_case("42", ExpressionKind::Numeric ; "integer")]
    #[test_case("-2.75", ExpressionKind::Numeric ; "decimal")]
    #[test_case("3/4", ExpressionKind::Numeric ; "rational")]
    #[test_case("2+3i", ExpressionKind::Numeric ; "complex")]
    #[test_case("1e5", ExpressionKind::Numeric ; "exponent")]
    #[test_case("2.5e-3", ExpressionKind::Numeric ; "negative exponent")]
    #[test_case("1e5 > 2.5E-3", ExpressionKind::Boolean ; "comparison of exponents")]
    #[test_case("xe5", ExpressionKind::Function ; "exponent-like identifier")]
    #[test_case("2+2", ExpressionKind::Unknown ; "arithmetic")]
    #[test_case("sin(pi)", ExpressionKind::Unknown ; "constant function call")]
    #[test_case("=", ExpressionKind::Unknown ; "bare operator")]
    #[test_case("", ExpressionKind::None ; "empty")]
    #[test_case(" \t\n", ExpressionKind::None ; "whitespace only")]
    fn test_classify(input: &str, expected: ExpressionKind) {
        assert_eq!(classify(input), expected);
    }

    #[test]
    fn test_suggest() {
        assert_eq!(
            suggest("{1,2}"),
            (ExpressionKind::Vector, OperationMode::Evaluation)
        );
        assert_eq!(suggest(""), (ExpressionKind::None, OperationMode::None));
    }

    #[test]
    fn test_double_equals_is_never_assignment() {
        assert_eq!(classify("a==5"), ExpressionKind::Equation);
    }

    #[test]
    fn test_malformed_input_is_total() {
        for input in ["{{", "}}", "((", "==", "<=>", "{1,{2}}", "\u{1f}", "é=1"] {
            let _ = classify(input);
        }
        assert_eq!(classify("{1,{2}}"), ExpressionKind::Unknown);
    }
}
