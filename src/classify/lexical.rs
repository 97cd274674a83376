//! Lexical helpers shared by the classifier and assignment memory.
//!
//! Everything here works on plain text: there is no parser and no AST, only
//! whitespace normalization, identifier scanning, top-level comparison
//! splitting and literal recognition.

use regex::Regex;
use std::sync::OnceLock;

/// Names treated as mathematical constants rather than free variables.
///
/// Matching is case-insensitive.
pub const CONSTANTS: &[&str] = &[
    "pi", "e", "i", "inf", "infinity", "degree", "catalan", "euler", "true", "false",
    "undefined",
];

/// Names of functions understood by the engine.
///
/// Letters that belong to one of these are not free variables.
/// Matching is case-insensitive.
pub const FUNCTIONS: &[&str] = &[
    // Trigonometric
    "sin", "cos", "tan", "cot", "sec", "csc", "asin", "acos", "atan", "acot", "asec", "acsc",
    "arcsin", "arccos", "arctan",
    // Hyperbolic
    "sinh", "cosh", "tanh", "coth", "sech", "csch", "asinh", "acosh", "atanh", "acoth",
    "asech", "acsch",
    // Exponential and logarithmic
    "exp", "ln", "log", "log10", "log2", "sqrt", "cbrt",
    // Rounding and arithmetic
    "abs", "sign", "floor", "ceil", "round", "gcd", "lcm", "mod", "max", "min", "fact",
    "factorial", "choose", "binomial", "perm",
    // Linear algebra
    "det", "transpose", "inverse", "dot", "cross", "norm",
    // Calculus and algebra
    "diff", "integrate", "limit", "sum", "product", "solve", "simplify", "expand", "factor",
];

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {{
        static $name: OnceLock<Regex> = OnceLock::new();
        $name.get_or_init(|| Regex::new($pattern).expect("valid regex"))
    }};
}

/// Regex matching one identifier token.
pub(crate) fn identifier_regex() -> &'static Regex {
    static_regex!(IDENTIFIER, r"[A-Za-z_][A-Za-z0-9_]*")
}

fn assignment_regex() -> &'static Regex {
    static_regex!(ASSIGNMENT, r"^([a-z])=(.+)$")
}

fn numeric_literal_regex() -> &'static Regex {
    static_regex!(
        NUMERIC_LITERAL,
        concat!(
            // integer or decimal, optionally with an exponent
            r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$",
            // rational
            r"|^[+-]?\d+/\d+$",
            // complex: a+bi, a-bi, bi, i
            r"|^[+-]?(?:\d+(?:\.\d+)?[+-])?(?:\d+(?:\.\d+)?\*?)?[iI]$",
        )
    )
}

/// Removes every whitespace character.
///
/// # Examples
///
/// ```
/// use mathgate::classify::normalize;
///
/// assert_eq!(normalize(" a = 2 * x "), "a=2*x");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Recognizes `<single-lowercase-letter>=<rest>` on a normalized string.
///
/// The remainder must be non-empty and must not contain another `=`, so
/// `a==b` and `a=b=c` are not assignments.
#[must_use]
pub fn parse_assignment(normalized: &str) -> Option<(char, &str)> {
    let captures = assignment_regex().captures(normalized)?;
    let name = captures.get(1)?.as_str().chars().next()?;
    let rest = captures.get(2)?.as_str();
    if rest.contains('=') {
        return None;
    }
    Some((name, rest))
}

/// Returns `true` if `name` is a known constant or function.
#[must_use]
pub fn is_known_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    CONSTANTS.contains(&lower.as_str()) || FUNCTIONS.contains(&lower.as_str())
}

/// Returns `true` if the identifier match `text[start..end]` is really the
/// exponent of a number literal, as in `1e5`, `2.5E10` or `2.5e-3`.
///
/// A bare `e` after a digit with no exponent digits (`2e`, `2e+x`) is the
/// constant, not an exponent.
pub(crate) fn is_exponent(text: &str, start: usize, end: usize) -> bool {
    let token = &text[start..end];
    let after_number = text[..start].ends_with(|c: char| c.is_ascii_digit() || c == '.');
    if !after_number || !token.starts_with(['e', 'E']) {
        return false;
    }

    let digits = &token[1..];
    if !digits.is_empty() {
        return digits.bytes().all(|b| b.is_ascii_digit());
    }
    matches!(text[end..].as_bytes(), [b'+' | b'-', d, ..] if d.is_ascii_digit())
}

/// Returns `true` if the text contains an identifier that is neither a
/// constant nor a function name. Exponents of number literals don't count.
#[must_use]
pub fn has_free_variable(text: &str) -> bool {
    identifier_regex()
        .find_iter(text)
        .any(|m| !is_exponent(text, m.start(), m.end()) && !is_known_name(m.as_str()))
}

/// Returns `true` if the text is a single integer, decimal, rational or
/// complex literal.
#[must_use]
pub fn is_numeric_literal(text: &str) -> bool {
    numeric_literal_regex().is_match(text)
}

/// A comparison split at its first top-level operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison<'a> {
    /// Text left of the operator.
    pub lhs: &'a str,
    /// The operator (`=`, `==`, `!=`, `<`, `<=`, `>`, `>=`).
    pub op: &'a str,
    /// Text right of the operator.
    pub rhs: &'a str,
}

/// Splits `text` at the first comparison operator outside any brackets.
///
/// A lone `!` is a factorial, not an operator.
#[must_use]
pub fn split_comparison(text: &str) -> Option<Comparison<'_>> {
    let bytes = text.as_bytes();
    let mut depth: usize = 0;

    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '=' | '<' | '>' | '!' if depth == 0 => {
                let followed_by_eq = bytes.get(i + 1) == Some(&b'=');
                let len = match (c, followed_by_eq) {
                    ('!', false) => continue,
                    (_, true) => 2,
                    (_, false) => 1,
                };
                return Some(Comparison {
                    lhs: &text[..i],
                    op: &text[i..i + len],
                    rhs: &text[i + len..],
                });
            }
            _ => {}
        }
    }
    None
}

/// Returns `true` if one side of a comparison is purely numeric: it has a
/// digit, no free variable and only arithmetic characters.
#[must_use]
pub fn is_numeric_side(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "+-*/^().!_".contains(c))
        && !has_free_variable(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_removes_all_whitespace() {
        assert_eq!(normalize("\t x \n+ 1 "), "x+1");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("a=5"), Some(('a', "5")));
        assert_eq!(parse_assignment("z=x^2+1"), Some(('z', "x^2+1")));
        assert_eq!(parse_assignment("a==5"), None);
        assert_eq!(parse_assignment("a=b=c"), None);
        assert_eq!(parse_assignment("A=5"), None);
        assert_eq!(parse_assignment("ab=5"), None);
        assert_eq!(parse_assignment("a="), None);
    }

    #[test]
    fn test_free_variables() {
        assert!(has_free_variable("x+1"));
        assert!(has_free_variable("2y"));
        assert!(has_free_variable("sin(t)"));
        assert!(!has_free_variable("sin(pi)"));
        assert!(!has_free_variable("2*E+I"));
        assert!(!has_free_variable("42"));
    }

    #[test]
    fn test_exponents_are_not_variables() {
        assert!(!has_free_variable("1e5"));
        assert!(!has_free_variable("2.5E10"));
        assert!(!has_free_variable("2.5e-3"));
        assert!(!has_free_variable("3.e+2"));
        assert!(!has_free_variable("2e"));
        assert!(has_free_variable("xe5"));
        assert!(has_free_variable("1e5x"));
        assert!(has_free_variable("2ex"));
        assert!(has_free_variable("2e-y"));
    }

    #[test]
    fn test_split_comparison() {
        let cmp = split_comparison("x^2==4").unwrap();
        assert_eq!((cmp.lhs, cmp.op, cmp.rhs), ("x^2", "==", "4"));

        let cmp = split_comparison("3<=4").unwrap();
        assert_eq!(cmp.op, "<=");

        let cmp = split_comparison("5!=120").unwrap();
        assert_eq!((cmp.lhs, cmp.op, cmp.rhs), ("5", "!=", "120"));

        assert!(split_comparison("5!").is_none());
        assert!(split_comparison("f(x=1)").is_none());
    }

    #[test]
    fn test_numeric_literals() {
        for literal in [
            "3", "-3", "2.5", ".5", "1e5", "-2.5e-3", "6.02E23", "1/2", "-7/3", "2+3i", "2-3.5i",
            "i", "4i", "2*i",
        ] {
            assert!(is_numeric_literal(literal), "{literal}");
        }
        for text in ["2+2", "x", "1/2/3", "", "+", "2i+3", "1e", "e5", "1e5.5"] {
            assert!(!is_numeric_literal(text), "{text}");
        }
    }

    #[test]
    fn test_numeric_side() {
        assert!(is_numeric_side("2+3"));
        assert!(is_numeric_side("2*pi"));
        assert!(is_numeric_side("1.5e-3"));
        assert!(!is_numeric_side("x+3"));
        assert!(!is_numeric_side("pi"));
        assert!(!is_numeric_side("{1}"));
    }
}
