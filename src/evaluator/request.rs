//! Operation requests.

use crate::core::OperationMode;
use serde::{Deserialize, Serialize};

/// One operation on one expression, as received from a caller.
///
/// Parameters are kept raw (`decimals` signed, domain as text) so that
/// validation, not deserialization, decides what is acceptable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Request {
    /// Symbolic evaluation.
    Evaluate {
        /// Raw expression.
        expression: String,
    },
    /// Numeric calculation.
    Calculate {
        /// Raw expression.
        expression: String,
        /// Requested precision.
        decimals: i64,
    },
    /// Plot over a domain.
    Draw {
        /// Raw expression.
        expression: String,
        /// Lower end of the domain.
        origin: String,
        /// Upper end of the domain.
        bound: String,
    },
}

impl Request {
    /// Returns the raw expression.
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::Evaluate { expression }
            | Self::Calculate { expression, .. }
            | Self::Draw { expression, .. } => expression,
        }
    }

    /// Returns the operation mode.
    #[must_use]
    pub const fn mode(&self) -> OperationMode {
        match self {
            Self::Evaluate { .. } => OperationMode::Evaluation,
            Self::Calculate { .. } => OperationMode::Calculation,
            Self::Draw { .. } => OperationMode::Drawing,
        }
    }
}
