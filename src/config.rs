//! Evaluator settings.

use crate::error::{Error, Result};
use serde::Serialize;

/// Default maximum precision accepted by `calculate`.
pub const DEFAULT_MAX_DECIMALS: u32 = 50;

/// Default plot variable.
pub const DEFAULT_PLOT_VARIABLE: &str = "x";

/// Settings for a [`crate::evaluator::CachedEvaluator`].
///
/// # Examples
///
/// ```
/// use mathgate::config::Settings;
///
/// let settings = Settings::default()
///     .with_max_decimals(20)
///     .with_cache_capacity(Some(1_000))
///     .with_plot_variable("t");
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Largest precision accepted by `calculate`.
    pub max_decimals: u32,

    /// Maximum number of cached results; `None` means unbounded.
    pub cache_capacity: Option<usize>,

    /// Variable passed to the engine when plotting.
    pub plot_variable: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_decimals: DEFAULT_MAX_DECIMALS,
            cache_capacity: None,
            plot_variable: DEFAULT_PLOT_VARIABLE.to_string(),
        }
    }
}

impl Settings {
    /// Sets the maximum precision.
    #[must_use]
    pub fn with_max_decimals(mut self, max_decimals: u32) -> Self {
        self.max_decimals = max_decimals;
        self
    }

    /// Sets the cache capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: Option<usize>) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Sets the plot variable.
    #[must_use]
    pub fn with_plot_variable(mut self, variable: impl Into<String>) -> Self {
        self.plot_variable = variable.into();
        self
    }

    /// Checks the settings for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the plot variable is not a single
    /// lowercase ASCII letter or the cache capacity is zero.
    pub fn validate(&self) -> Result<()> {
        let mut chars = self.plot_variable.chars();
        let single_letter = matches!(
            (chars.next(), chars.next()),
            (Some(c), None) if c.is_ascii_lowercase()
        );
        if !single_letter {
            return Err(Error::Config {
                message: format!(
                    "plot variable must be a single lowercase letter, got '{}'",
                    self.plot_variable
                ),
            });
        }

        if self.cache_capacity == Some(0) {
            return Err(Error::Config {
                message: "cache capacity must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
