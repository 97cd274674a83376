//! Cached evaluation pipeline.
//!
//! Every request goes through the same stages:
//!
//! 1. validation of the raw inputs (fails fast, never reaches the engine)
//! 2. assignment memory: an assignment is stored and returned immediately,
//!    anything else has its bound variables substituted
//! 3. cache key derivation and lookup, with at most one engine call per key
//! 4. the engine call itself on a miss

mod request;

pub use request::Request;

use crate::cache::{CacheKey, Cached, ResultCache};
use crate::classify::classify;
use crate::config::Settings;
use crate::core::{EvaluationResult, ExpressionKind, OperationMode, Outcome, ResultSource};
use crate::engine::{Cas, CasResult};
use crate::error::Result;
use crate::session::AssignmentMemory;
use crate::validate::{validate_decimals, validate_domain, validate_expression};
use rayon::prelude::*;
use std::sync::Arc;

/// An expression after the memory stage.
enum Prepared {
    /// The input was an assignment and is already answered.
    Assigned(Outcome),
    /// Substituted expression ready for the engine.
    Ready {
        expression: String,
        kind: ExpressionKind,
    },
}

/// Facade in front of a computer-algebra engine.
///
/// One evaluator (and its cache) is shared by every session; each call takes
/// the caller's [`AssignmentMemory`] explicitly.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use mathgate::core::{EvaluationResult, ResultSource};
/// use mathgate::engine::{Cas, CasResult};
/// use mathgate::evaluator::CachedEvaluator;
/// use mathgate::session::AssignmentMemory;
///
/// struct Echo;
///
/// impl Cas for Echo {
///     fn evaluate(&self, e: &str) -> CasResult { Ok(EvaluationResult::new(e)) }
///     fn calculate(&self, e: &str, _: u32) -> CasResult { Ok(EvaluationResult::new(e)) }
///     fn draw(&self, e: &str, _: &str, _: &str, _: &str) -> CasResult {
///         Ok(EvaluationResult::new(e))
///     }
/// }
///
/// let evaluator = CachedEvaluator::with_defaults(Arc::new(Echo));
/// let mut memory = AssignmentMemory::new();
///
/// let assigned = evaluator.evaluate(&mut memory, "a = 2").unwrap();
/// assert_eq!(assigned.source, ResultSource::Assignment);
///
/// let outcome = evaluator.evaluate(&mut memory, "a * 3").unwrap();
/// assert_eq!(outcome.formatted(), "2 * 3");
/// ```
pub struct CachedEvaluator {
    cas: Arc<dyn Cas>,
    cache: ResultCache,
    settings: Settings,
}

impl std::fmt::Debug for CachedEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedEvaluator")
            .field("cas", &self.cas.name())
            .field("cache", &self.cache)
            .field("settings", &self.settings)
            .finish()
    }
}

impl CachedEvaluator {
    /// Creates an evaluator over `cas` with the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the settings are inconsistent.
    pub fn new(cas: Arc<dyn Cas>, settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            cas,
            cache: ResultCache::new(settings.cache_capacity),
            settings,
        })
    }

    /// Creates an evaluator with default settings.
    #[must_use]
    pub fn with_defaults(cas: Arc<dyn Cas>) -> Self {
        let settings = Settings::default();
        Self {
            cas,
            cache: ResultCache::new(settings.cache_capacity),
            settings,
        }
    }

    /// Returns the settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the shared result cache.
    #[must_use]
    pub const fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Evaluates an expression symbolically.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed expression, a computation
    /// error if the engine fails, or an internal error if the cache is
    /// corrupted.
    pub fn evaluate(&self, memory: &mut AssignmentMemory, expression: &str) -> Result<Outcome> {
        validate_expression(expression)?;

        match prepare(memory, expression, OperationMode::Evaluation) {
            Prepared::Assigned(outcome) => Ok(outcome),
            Prepared::Ready { expression, kind } => self.run_evaluation(expression, kind),
        }
    }

    /// Calculates an expression numerically with `decimals` digits.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed expression or a precision
    /// outside `0..=max_decimals`, a computation error if the engine fails, or
    /// an internal error if the cache is corrupted.
    pub fn calculate(
        &self,
        memory: &mut AssignmentMemory,
        expression: &str,
        decimals: i64,
    ) -> Result<Outcome> {
        validate_expression(expression)?;
        let decimals = validate_decimals(decimals, self.settings.max_decimals)?;

        match prepare(memory, expression, OperationMode::Calculation) {
            Prepared::Assigned(outcome) => Ok(outcome),
            Prepared::Ready { expression, kind } => {
                let key = CacheKey::calculation(&expression, decimals);
                let cached = self.lookup(&key, || self.cas.calculate(&expression, decimals))?;
                Ok(finish(expression, kind, OperationMode::Calculation, cached))
            }
        }
    }

    /// Plots an expression over `[origin, bound]`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed expression, an origin or
    /// bound that is not a real number, or `origin >= bound`; a computation
    /// error if the engine fails; or an internal error if the cache is
    /// corrupted.
    pub fn draw(
        &self,
        memory: &mut AssignmentMemory,
        expression: &str,
        origin: &str,
        bound: &str,
    ) -> Result<Outcome> {
        validate_expression(expression)?;
        let domain = validate_domain(origin, bound)?;

        match prepare(memory, expression, OperationMode::Drawing) {
            Prepared::Assigned(outcome) => Ok(outcome),
            Prepared::Ready { expression, kind } => {
                let key = CacheKey::drawing(&expression, &domain.origin, &domain.bound);
                let cached = self.lookup(&key, || {
                    self.cas.draw(
                        &expression,
                        &self.settings.plot_variable,
                        &domain.origin,
                        &domain.bound,
                    )
                })?;
                Ok(finish(expression, kind, OperationMode::Drawing, cached))
            }
        }
    }

    /// Runs one [`Request`].
    ///
    /// # Errors
    ///
    /// See [`evaluate`](Self::evaluate), [`calculate`](Self::calculate) and
    /// [`draw`](Self::draw).
    pub fn dispatch(&self, memory: &mut AssignmentMemory, request: &Request) -> Result<Outcome> {
        match request {
            Request::Evaluate { expression } => self.evaluate(memory, expression),
            Request::Calculate {
                expression,
                decimals,
            } => self.calculate(memory, expression, *decimals),
            Request::Draw {
                expression,
                origin,
                bound,
            } => self.draw(memory, expression, origin, bound),
        }
    }

    /// Evaluates many expressions for one session.
    ///
    /// Validation and assignment handling run in input order, so an
    /// assignment affects every later expression. The engine calls then run
    /// in parallel; duplicate expressions are computed once. Results are
    /// returned in input order.
    pub fn evaluate_batch<S>(
        &self,
        memory: &mut AssignmentMemory,
        expressions: &[S],
    ) -> Vec<Result<Outcome>>
    where
        S: AsRef<str>,
    {
        let prepared: Vec<Result<Prepared>> = expressions
            .iter()
            .map(|expression| {
                let expression = expression.as_ref();
                validate_expression(expression)?;
                Ok(prepare(memory, expression, OperationMode::Evaluation))
            })
            .collect();

        tracing::debug!(count = prepared.len(), "evaluating batch");

        prepared
            .into_par_iter()
            .map(|prepared| match prepared? {
                Prepared::Assigned(outcome) => Ok(outcome),
                Prepared::Ready { expression, kind } => self.run_evaluation(expression, kind),
            })
            .collect()
    }

    fn run_evaluation(&self, expression: String, kind: ExpressionKind) -> Result<Outcome> {
        let key = CacheKey::evaluation(&expression);
        let cached = self.lookup(&key, || self.cas.evaluate(&expression))?;
        Ok(finish(expression, kind, OperationMode::Evaluation, cached))
    }

    fn lookup(&self, key: &CacheKey, compute: impl FnOnce() -> CasResult) -> Result<Cached> {
        self.cache
            .get_or_compute(key, || {
                tracing::info!(%key, engine = self.cas.name(), "computing");
                compute().inspect_err(|err| {
                    tracing::warn!(%key, cause = %err.cause, problems = err.problems.len(), "engine failed");
                })
            })
    }
}

/// Runs the memory stage for one validated expression.
fn prepare(memory: &mut AssignmentMemory, raw: &str, mode: OperationMode) -> Prepared {
    let kind = classify(raw);
    let processed = memory.process(raw);

    if kind == ExpressionKind::Assignment {
        return Prepared::Assigned(Outcome {
            result: Arc::new(EvaluationResult::new(processed.clone())),
            expression: processed,
            kind,
            mode,
            source: ResultSource::Assignment,
        });
    }

    Prepared::Ready {
        expression: processed.trim().to_string(),
        kind,
    }
}

fn finish(expression: String, kind: ExpressionKind, mode: OperationMode, cached: Cached) -> Outcome {
    Outcome {
        expression,
        kind,
        mode,
        result: cached.result,
        source: if cached.hit {
            ResultSource::Cache
        } else {
            ResultSource::Engine
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ComputationError, Error, ErrorCategory, ValidationError};
    use std::sync::Mutex;

    /// Engine double that records every call.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn record(&self, call: String) -> CasResult {
            self.calls.lock().unwrap().push(call.clone());
            Ok(EvaluationResult::new(call))
        }

        fn count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Cas for Recorder {
        fn evaluate(&self, expression: &str) -> CasResult {
            self.record(format!("eval({expression})"))
        }

        fn calculate(&self, expression: &str, decimals: u32) -> CasResult {
            self.record(format!("calc({expression},{decimals})"))
        }

        fn draw(&self, expression: &str, variable: &str, origin: &str, bound: &str) -> CasResult {
            self.record(format!("draw({expression},{variable},{origin},{bound})"))
        }
    }

    fn setup() -> (Arc<Recorder>, CachedEvaluator, AssignmentMemory) {
        let cas = Arc::new(Recorder::default());
        let evaluator = CachedEvaluator::with_defaults(Arc::clone(&cas) as Arc<dyn Cas>);
        (cas, evaluator, AssignmentMemory::new())
    }

    #[test]
    fn test_assignment_short_circuits() {
        let (cas, evaluator, mut memory) = setup();
        let outcome = evaluator.evaluate(&mut memory, "a = 5").unwrap();
        assert_eq!(outcome.formatted(), "a = 5");
        assert_eq!(outcome.kind, ExpressionKind::Assignment);
        assert_eq!(outcome.source, ResultSource::Assignment);
        assert_eq!(cas.count(), 0);
    }

    #[test]
    fn test_substitution_reaches_engine() {
        let (cas, evaluator, mut memory) = setup();
        evaluator.evaluate(&mut memory, "a=5").unwrap();
        let outcome = evaluator.evaluate(&mut memory, " a+1 ").unwrap();
        assert_eq!(outcome.expression, "5+1");
        assert_eq!(outcome.formatted(), "eval(5+1)");
        assert_eq!(cas.count(), 1);
    }

    #[test]
    fn test_evaluate_cached() {
        let (cas, evaluator, mut memory) = setup();
        let first = evaluator.evaluate(&mut memory, "2+2").unwrap();
        let second = evaluator.evaluate(&mut memory, "2+2").unwrap();
        assert!(Arc::ptr_eq(&first.result, &second.result));
        assert_eq!(first.source, ResultSource::Engine);
        assert_eq!(second.source, ResultSource::Cache);
        assert_eq!(cas.count(), 1);
    }

    #[test]
    fn test_draw_passes_plot_variable() {
        let cas = Arc::new(Recorder::default());
        let settings = Settings::default().with_plot_variable("t");
        let evaluator = CachedEvaluator::new(Arc::clone(&cas) as Arc<dyn Cas>, settings).unwrap();
        let mut memory = AssignmentMemory::new();

        let outcome = evaluator.draw(&mut memory, "sin(t)", " 0 ", "6.28").unwrap();
        assert_eq!(outcome.formatted(), "draw(sin(t),t,0,6.28)");
        assert_eq!(outcome.mode, OperationMode::Drawing);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings::default().with_plot_variable("xy");
        let err = CachedEvaluator::new(Arc::new(Recorder::default()), settings).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_validation_precedes_memory() {
        let (cas, evaluator, mut memory) = setup();
        let err = evaluator.calculate(&mut memory, "a=1", 99).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(memory.is_empty());
        assert_eq!(cas.count(), 0);
    }

    #[test]
    fn test_draw_validation_distinguishes_failures() {
        let (_, evaluator, mut memory) = setup();
        let err = evaluator.draw(&mut memory, "x", "a", "1").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::NotANumber { field: "origin", .. })
        ));
        let err = evaluator.draw(&mut memory, "x", "1", "0").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::EmptyDomain { .. })
        ));
    }

    #[test]
    fn test_dispatch() {
        let (_, evaluator, mut memory) = setup();
        let request = Request::Calculate {
            expression: "pi".to_string(),
            decimals: 4,
        };
        let outcome = evaluator.dispatch(&mut memory, &request).unwrap();
        assert_eq!(outcome.formatted(), "calc(pi,4)");
    }

    struct Failing;

    impl Cas for Failing {
        fn evaluate(&self, _: &str) -> CasResult {
            Err(ComputationError::new("unsupported").with_problems(vec!["p".to_string()]))
        }

        fn calculate(&self, _: &str, _: u32) -> CasResult {
            Err(ComputationError::new("unsupported"))
        }

        fn draw(&self, _: &str, _: &str, _: &str, _: &str) -> CasResult {
            Err(ComputationError::new("unsupported"))
        }
    }

    #[test]
    fn test_computation_error_propagates() {
        let evaluator = CachedEvaluator::with_defaults(Arc::new(Failing));
        let mut memory = AssignmentMemory::new();
        let err = evaluator.evaluate(&mut memory, "x").unwrap_err();
        let Error::Computation(computation) = err else {
            unreachable!("expected computation error");
        };
        assert_eq!(computation.problems, vec!["p".to_string()]);
        assert!(evaluator.cache().is_empty());
    }

    #[test]
    fn test_batch_orders_assignments() {
        let (cas, evaluator, mut memory) = setup();
        let results = evaluator.evaluate_batch(&mut memory, &["a=2", "a+1", "", "a+1", "a=3", "a+1"]);

        assert_eq!(results.len(), 6);
        assert_eq!(results[0].as_ref().unwrap().source, ResultSource::Assignment);
        assert_eq!(results[1].as_ref().unwrap().formatted(), "eval(2+1)");
        assert!(matches!(
            results[2],
            Err(Error::Validation(ValidationError::EmptyExpression))
        ));
        assert_eq!(results[3].as_ref().unwrap().formatted(), "eval(2+1)");
        assert_eq!(results[5].as_ref().unwrap().formatted(), "eval(3+1)");
        assert_eq!(cas.count(), 2);
    }
}
