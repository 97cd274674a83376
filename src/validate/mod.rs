//! Structural validation of operation inputs.
//!
//! These checks run before any cache lookup or engine call and never panic
//! on malformed input: each returns the first problem it finds as a
//! [`ValidationError`] carrying the field and the rejected value.

use crate::error::ValidationError;

/// Maximum number of characters echoed back in an error fragment.
const FRAGMENT_LEN: usize = 24;

/// Punctuation accepted in expressions besides ASCII letters, digits and
/// whitespace.
pub const ALLOWED_PUNCTUATION: &str = "+-*/^()[]{},.=<>!_'|&%:";

/// Checks that an expression is non-empty, uses only accepted characters
/// and has properly nested `()`, `[]` and `{}`.
///
/// # Examples
///
/// ```
/// use mathgate::validate::validate_expression;
///
/// assert!(validate_expression("sin(x) + {1, 2}").is_ok());
/// assert!(validate_expression("(x + 1").is_err());
/// assert!(validate_expression("   ").is_err());
/// ```
///
/// # Errors
///
/// Returns the first failed check.
pub fn validate_expression(expression: &str) -> Result<(), ValidationError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyExpression);
    }

    if let Some((i, character)) = trimmed.char_indices().find(|(_, c)| !is_allowed(*c)) {
        return Err(ValidationError::DisallowedCharacter {
            character,
            fragment: fragment(trimmed, i),
        });
    }

    check_nesting(trimmed)
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == ' '
        || c == '\t'
        || c == '\n'
        || c == '\r'
        || ALLOWED_PUNCTUATION.contains(c)
}

fn check_nesting(text: &str) -> Result<(), ValidationError> {
    let mut open: Vec<(usize, char)> = Vec::new();

    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => open.push((i, c)),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match open.pop() {
                    Some((_, opener)) if opener == expected => {}
                    _ => {
                        return Err(ValidationError::UnbalancedDelimiters {
                            fragment: fragment(text, i),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    match open.pop() {
        Some((i, _)) => Err(ValidationError::UnbalancedDelimiters {
            fragment: fragment(text, i),
        }),
        None => Ok(()),
    }
}

fn fragment(text: &str, start: usize) -> String {
    text[start..].chars().take(FRAGMENT_LEN).collect()
}

/// Checks a requested precision against `[0, max]`.
///
/// Returns the precision as an unsigned value on success.
///
/// # Examples
///
/// ```
/// use mathgate::validate::validate_decimals;
///
/// assert_eq!(validate_decimals(10, 50), Ok(10));
/// assert!(validate_decimals(-1, 50).is_err());
/// assert!(validate_decimals(51, 50).is_err());
/// ```
///
/// # Errors
///
/// Returns [`ValidationError::DecimalsOutOfRange`] naming the rejected value.
pub fn validate_decimals(decimals: i64, max: u32) -> Result<u32, ValidationError> {
    u32::try_from(decimals)
        .ok()
        .filter(|d| *d <= max)
        .ok_or(ValidationError::DecimalsOutOfRange {
            value: decimals,
            max,
        })
}

/// A validated plot domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    /// Origin as given (trimmed).
    pub origin: String,
    /// Bound as given (trimmed).
    pub bound: String,
    /// Parsed origin.
    pub start: f64,
    /// Parsed bound.
    pub end: f64,
}

/// Checks that origin and bound are finite reals with `origin < bound`.
///
/// A parse failure is reported as [`ValidationError::NotANumber`] and an
/// ordering failure as [`ValidationError::EmptyDomain`], so callers can tell
/// the two apart.
///
/// # Examples
///
/// ```
/// use mathgate::validate::validate_domain;
///
/// let domain = validate_domain(" -1.5 ", "2").unwrap();
/// assert_eq!(domain.origin, "-1.5");
/// assert!(validate_domain("5", "1").is_err());
/// ```
///
/// # Errors
///
/// Returns the first failed check, origin before bound.
pub fn validate_domain(origin: &str, bound: &str) -> Result<Domain, ValidationError> {
    let origin = origin.trim();
    let bound = bound.trim();
    let start = parse_real("origin", origin)?;
    let end = parse_real("bound", bound)?;

    if start >= end {
        return Err(ValidationError::EmptyDomain {
            origin: origin.to_string(),
            bound: bound.to_string(),
        });
    }

    Ok(Domain {
        origin: origin.to_string(),
        bound: bound.to_string(),
        start,
        end,
    })
}

fn parse_real(field: &'static str, value: &str) -> Result<f64, ValidationError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("x+1" ; "polynomial")]
    #[test_case("{{1,2},{3,4}}" ; "matrix")]
    #[test_case("f(x) = [a, b]" ; "mixed brackets")]
    #[test_case("  2 * (3 + 4)  " ; "padded")]
    #[test_case("x' + |x| >= 1 & y != 2" ; "operators")]
    fn test_valid_expressions(expression: &str) {
        assert_eq!(validate_expression(expression), Ok(()));
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(validate_expression(""), Err(ValidationError::EmptyExpression));
        assert_eq!(
            validate_expression(" \t "),
            Err(ValidationError::EmptyExpression)
        );
    }

    #[test_case("(x+1", "(x+1" ; "unclosed paren")]
    #[test_case("x+1)", ")" ; "stray close")]
    #[test_case("{1,2]", "]" ; "mismatched close")]
    #[test_case("[(x])", "])" ; "crossed nesting")]
    fn test_unbalanced(expression: &str, expected_fragment: &str) {
        assert_eq!(
            validate_expression(expression),
            Err(ValidationError::UnbalancedDelimiters {
                fragment: expected_fragment.to_string(),
            })
        );
    }

    #[test_case("x;rm", ';' ; "semicolon")]
    #[test_case("\"x\"", '"' ; "quote")]
    #[test_case("x\u{1f}2", '\u{1f}' ; "unit separator")]
    #[test_case("π*2", 'π' ; "non ascii")]
    fn test_disallowed(expression: &str, expected: char) {
        match validate_expression(expression) {
            Err(ValidationError::DisallowedCharacter { character, .. }) => {
                assert_eq!(character, expected);
            }
            other => unreachable!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_fragment_is_truncated() {
        let long = format!("({}", "x".repeat(100));
        let Err(ValidationError::UnbalancedDelimiters { fragment }) = validate_expression(&long)
        else {
            unreachable!("expected unbalanced delimiters");
        };
        assert_eq!(fragment.chars().count(), FRAGMENT_LEN);
    }

    #[test_case(0, Ok(0) ; "zero")]
    #[test_case(50, Ok(50) ; "maximum")]
    #[test_case(-1, Err(ValidationError::DecimalsOutOfRange { value: -1, max: 50 }) ; "negative")]
    #[test_case(51, Err(ValidationError::DecimalsOutOfRange { value: 51, max: 50 }) ; "too large")]
    #[test_case(i64::MAX, Err(ValidationError::DecimalsOutOfRange { value: i64::MAX, max: 50 }) ; "overflow")]
    fn test_decimals(decimals: i64, expected: Result<u32, ValidationError>) {
        assert_eq!(validate_decimals(decimals, 50), expected);
    }

    #[test]
    fn test_domain_ok() {
        let domain = validate_domain("-3", "3").unwrap();
        assert_eq!((domain.origin.as_str(), domain.bound.as_str()), ("-3", "3"));
        assert!((domain.start + 3.0).abs() < f64::EPSILON);
    }

    #[test_case("abc", "1", "origin" ; "origin not a number")]
    #[test_case("0", "", "bound" ; "empty bound")]
    #[test_case("NaN", "1", "origin" ; "nan origin")]
    #[test_case("0", "inf", "bound" ; "infinite bound")]
    fn test_domain_not_a_number(origin: &str, bound: &str, field: &str) {
        let err = validate_domain(origin, bound).unwrap_err();
        assert!(matches!(err, ValidationError::NotANumber { .. }));
        assert_eq!(err.field(), field);
    }

    #[test_case("5", "1" ; "reversed")]
    #[test_case("2", "2" ; "equal")]
    fn test_domain_ordering(origin: &str, bound: &str) {
        assert!(matches!(
            validate_domain(origin, bound),
            Err(ValidationError::EmptyDomain { .. })
        ));
    }
}
