//! Engine adapter backed by an external program.
//!
//! The program is run once per call as
//! `<program> [args...] <operation> <operands...>`:
//!
//! - `evaluate <expression>`
//! - `calculate <expression> <decimals>`
//! - `draw <expression> <variable> <origin> <bound>`
//!
//! A zero exit status means success: trimmed stdout is the formatted result
//! and each non-empty stderr line is a diagnostic problem. Any other status
//! is a computation error carrying the stderr lines.

use crate::core::EvaluationResult;
use crate::engine::{Cas, CasResult};
use crate::error::ComputationError;
use std::process::{Command, Stdio};

/// Engine that shells out to an external program.
///
/// # Examples
///
/// ```no_run
/// use mathgate::engine::{Cas, ProcessCas};
///
/// let cas = ProcessCas::new("my-cas").arg("--quiet");
/// let result = cas.evaluate("D[x^2, x]").unwrap();
/// println!("{}", result.formatted);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCas {
    program: String,
    args: Vec<String>,
}

impl ProcessCas {
    /// Creates an adapter for `program` with no leading arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends a leading argument passed before the operation name.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several leading arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, operands: &[&str]) -> CasResult {
        tracing::info!(program = %self.program, operation = operands.first().copied().unwrap_or(""), "invoking engine");

        let output = Command::new(&self.program)
            .args(&self.args)
            .args(operands)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ComputationError::new(format!("failed to start {}: {e}", self.program)))?;

        let problems: Vec<String> = String::from_utf8_lossy(&output.stderr)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        if !output.status.success() {
            let cause = output.status.code().map_or_else(
                || format!("{} was terminated by a signal", self.program),
                |code| format!("{} exited with status {code}", self.program),
            );
            return Err(ComputationError::new(cause).with_problems(problems));
        }

        let formatted = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(EvaluationResult::new(formatted).with_problems(problems))
    }
}

impl Cas for ProcessCas {
    fn evaluate(&self, expression: &str) -> CasResult {
        self.run(&["evaluate", expression])
    }

    fn calculate(&self, expression: &str, decimals: u32) -> CasResult {
        self.run(&["calculate", expression, &decimals.to_string()])
    }

    fn draw(&self, expression: &str, variable: &str, origin: &str, bound: &str) -> CasResult {
        self.run(&["draw", expression, variable, origin, bound])
    }

    fn name(&self) -> &str {
        &self.program
    }
}
