//! Computer-algebra engine boundary.
//!
//! The engine is an opaque capability: it evaluates, calculates or plots an
//! expression and returns a formatted result with optional diagnostics. The
//! pipeline only ever talks to it through the [`Cas`] trait.

mod process;

pub use process::ProcessCas;

use crate::core::EvaluationResult;
use crate::error::ComputationError;

/// Result type for engine calls.
pub type CasResult = std::result::Result<EvaluationResult, ComputationError>;

/// Trait for computer-algebra engines.
///
/// Implementations must be thread-safe (`Send + Sync`): one engine serves
/// every session, and batch evaluation calls it from several threads.
///
/// # Examples
///
/// ```
/// use mathgate::core::EvaluationResult;
/// use mathgate::engine::{Cas, CasResult};
///
/// struct Echo;
///
/// impl Cas for Echo {
///     fn evaluate(&self, expression: &str) -> CasResult {
///         Ok(EvaluationResult::new(expression))
///     }
///
///     fn calculate(&self, expression: &str, decimals: u32) -> CasResult {
///         Ok(EvaluationResult::new(format!("{expression}~{decimals}")))
///     }
///
///     fn draw(&self, expression: &str, variable: &str, origin: &str, bound: &str) -> CasResult {
///         Ok(EvaluationResult::new(format!("{expression}@{variable}[{origin},{bound}]")))
///     }
/// }
///
/// assert_eq!(Echo.calculate("pi", 3).unwrap().formatted, "pi~3");
/// ```
pub trait Cas: Send + Sync {
    /// Evaluates an expression symbolically.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot evaluate the expression.
    fn evaluate(&self, expression: &str) -> CasResult;

    /// Calculates a numeric value with `decimals` digits of precision.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot calculate the expression.
    fn calculate(&self, expression: &str, decimals: u32) -> CasResult;

    /// Plots `expression` in `variable` over `[origin, bound]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot plot the expression.
    fn draw(&self, expression: &str, variable: &str, origin: &str, bound: &str) -> CasResult;

    /// Returns a short name for logging.
    fn name(&self) -> &str {
        "cas"
    }
}
