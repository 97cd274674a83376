//! Cache keys.

use crate::core::OperationMode;
use serde::Serialize;
use std::fmt;

/// Separator between key segments.
///
/// U+001F never survives expression validation and never appears in a
/// numeric literal, so joined segments cannot be confused with one another.
pub const SEGMENT_SEPARATOR: char = '\u{1f}';

/// Deterministic key identifying one engine computation.
///
/// The operation mode is part of the key, and the segments are joined with
/// [`SEGMENT_SEPARATOR`].
///
/// # Examples
///
/// ```
/// use mathgate::cache::CacheKey;
///
/// let a = CacheKey::calculation("x", 2);
/// let b = CacheKey::calculation("x", 3);
/// assert_ne!(a, b);
/// assert_eq!(a, CacheKey::calculation("x", 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey {
    mode: OperationMode,
    text: String,
}

impl CacheKey {
    /// Key for symbolic evaluation: the expression alone.
    #[must_use]
    pub fn evaluation(expression: &str) -> Self {
        Self::join(OperationMode::Evaluation, &[expression])
    }

    /// Key for numeric calculation: expression and precision.
    #[must_use]
    pub fn calculation(expression: &str, decimals: u32) -> Self {
        Self::join(
            OperationMode::Calculation,
            &[expression, &decimals.to_string()],
        )
    }

    /// Key for plotting: expression, origin and bound.
    ///
    /// The plot variable is fixed per evaluator and is not part of the key.
    #[must_use]
    pub fn drawing(expression: &str, origin: &str, bound: &str) -> Self {
        Self::join(OperationMode::Drawing, &[expression, origin, bound])
    }

    fn join(mode: OperationMode, segments: &[&str]) -> Self {
        debug_assert!(
            segments.iter().all(|s| !s.contains(SEGMENT_SEPARATOR)),
            "cache key segment contains the separator"
        );
        let mut text = String::with_capacity(segments.iter().map(|s| s.len() + 1).sum());
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                text.push(SEGMENT_SEPARATOR);
            }
            text.push_str(segment);
        }
        Self { mode, text }
    }

    /// Operation this key belongs to.
    #[must_use]
    pub const fn mode(&self) -> OperationMode {
        self.mode
    }

    /// Joined segment text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Individual segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.text.split(SEGMENT_SEPARATOR)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.mode)?;
        for (i, segment) in self.segments().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_key_is_expression() {
        let key = CacheKey::evaluation("2+2");
        assert_eq!(key.as_str(), "2+2");
        assert_eq!(key.mode(), OperationMode::Evaluation);
    }

    #[test]
    fn test_segments() {
        let key = CacheKey::drawing("sin(x)", "-1", "1");
        let segments: Vec<&str> = key.segments().collect();
        assert_eq!(segments, vec!["sin(x)", "-1", "1"]);
    }

    #[test]
    fn test_no_ambiguous_collisions() {
        assert_ne!(CacheKey::calculation("a_1", 2), CacheKey::calculation("a", 12));
        assert_ne!(
            CacheKey::drawing("x", "1", "23"),
            CacheKey::drawing("x", "12", "3")
        );
    }

    #[test]
    fn test_modes_do_not_collide() {
        let evaluation = CacheKey {
            mode: OperationMode::Evaluation,
            text: format!("x{SEGMENT_SEPARATOR}2"),
        };
        let calculation = CacheKey::calculation("x", 2);
        assert_eq!(evaluation.as_str(), calculation.as_str());
        assert_ne!(evaluation, calculation);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CacheKey::drawing("x", "0", "1").to_string(),
            "DRAWING:x|0|1"
        );
    }
}
