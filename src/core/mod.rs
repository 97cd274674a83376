//! Core domain models for mathgate.
//!
//! Expression kinds, operation modes and the results that flow back from the
//! computation engine. These are pure data types with no I/O dependencies.

pub mod kind;
pub mod result;

pub use kind::{ExpressionKind, OperationMode};
pub use result::{EvaluationResult, Outcome, ResultSource};
