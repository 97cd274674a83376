//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::classify::{classify, suggest};
use crate::cli::output::{
    EntryResult, ErrorReport, OutputFormat, ScriptEntry, format_classification, format_entries,
    format_outcome,
};
use crate::cli::parser::{Cli, Commands};
use crate::core::ExpressionKind;
use crate::engine::{Cas, ProcessCas};
use crate::error::{CommandError, Error, IoError, Result};
use crate::evaluator::{CachedEvaluator, Request};
use crate::session::AssignmentMemory;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

/// One parsed script line.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Request(Request),
    Vars,
    Clear,
}

/// Executes the CLI command.
///
/// Builds a [`ProcessCas`] from `--engine` / `MATHGATE_ENGINE` for every
/// command that needs one.
///
/// # Errors
///
/// Returns an error if no engine is configured or the command fails to
/// execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    if let Commands::Classify { expression } = &cli.command {
        return Ok(cmd_classify(expression, format));
    }

    let program = cli.engine.as_deref().ok_or_else(|| Error::Config {
        message: "no engine configured; pass --engine or set MATHGATE_ENGINE".to_string(),
    })?;
    let cas = ProcessCas::new(program).args(cli.engine_args.iter().cloned());

    execute_with(cli, Arc::new(cas))
}

/// Executes the CLI command against the given engine.
///
/// # Errors
///
/// Returns an error if the settings are invalid or the command fails.
pub fn execute_with(cli: &Cli, cas: Arc<dyn Cas>) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let evaluator = CachedEvaluator::new(cas, cli.settings())?;
    let mut memory = AssignmentMemory::new();

    match &cli.command {
        Commands::Evaluate {
            expression,
            bindings,
        } => {
            apply_bindings(&evaluator, &mut memory, bindings)?;
            let outcome = evaluator.evaluate(&mut memory, expression)?;
            Ok(format_outcome(&outcome, format))
        }
        Commands::Calculate {
            expression,
            decimals,
            bindings,
        } => {
            apply_bindings(&evaluator, &mut memory, bindings)?;
            let outcome = evaluator.calculate(&mut memory, expression, *decimals)?;
            Ok(format_outcome(&outcome, format))
        }
        Commands::Draw {
            expression,
            origin,
            bound,
            bindings,
        } => {
            apply_bindings(&evaluator, &mut memory, bindings)?;
            let outcome = evaluator.draw(&mut memory, expression, origin, bound)?;
            Ok(format_outcome(&outcome, format))
        }
        Commands::Classify { expression } => Ok(cmd_classify(expression, format)),
        Commands::Run { file } => {
            let script = read_input(file.as_deref())?;
            let entries = run_script(&evaluator, &mut memory, &script);
            Ok(format_entries(&entries, format))
        }
        Commands::Batch { file } => {
            let text = read_input(Some(file.as_path()))?;
            let entries = run_batch(&evaluator, &mut memory, &text);
            Ok(format_entries(&entries, format))
        }
    }
}

fn cmd_classify(expression: &str, format: OutputFormat) -> String {
    let (kind, mode) = suggest(expression);
    format_classification(expression, kind, mode, format)
}

/// Applies `--let` bindings in order.
fn apply_bindings(
    evaluator: &CachedEvaluator,
    memory: &mut AssignmentMemory,
    bindings: &[String],
) -> Result<()> {
    for binding in bindings {
        if classify(binding) != ExpressionKind::Assignment {
            return Err(CommandError::InvalidArgument(format!(
                "--let expects '<letter>=<value>', got '{binding}'"
            ))
            .into());
        }
        evaluator.evaluate(memory, binding)?;
    }
    Ok(())
}

/// Reads a file, or stdin for `None` and `-`.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read_to_string(path).map_err(|e| {
                let path = path.display().to_string();
                if e.kind() == io::ErrorKind::NotFound {
                    IoError::FileNotFound { path }.into()
                } else {
                    IoError::ReadFailed {
                        path,
                        reason: e.to_string(),
                    }
                    .into()
                }
            })
        }
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Non-blank, non-comment lines with their one-based line numbers.
fn script_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Runs a script sequentially in one session. A failing line is reported
/// and the run continues.
fn run_script(
    evaluator: &CachedEvaluator,
    memory: &mut AssignmentMemory,
    script: &str,
) -> Vec<ScriptEntry> {
    script_lines(script)
        .map(|(line, input)| {
            let result = match parse_line(line, input) {
                Ok(Step::Request(request)) => match evaluator.dispatch(memory, &request) {
                    Ok(outcome) => EntryResult::Outcome(outcome),
                    Err(err) => EntryResult::Error(ErrorReport::from(&err)),
                },
                Ok(Step::Vars) => EntryResult::Bindings(memory.snapshot()),
                Ok(Step::Clear) => {
                    memory.clear();
                    EntryResult::Cleared
                }
                Err(err) => EntryResult::Error(ErrorReport::from(&Error::from(err))),
            };
            ScriptEntry {
                line,
                input: input.to_string(),
                result,
            }
        })
        .collect()
}

/// Evaluates every line of `text` through the parallel batch path.
fn run_batch(
    evaluator: &CachedEvaluator,
    memory: &mut AssignmentMemory,
    text: &str,
) -> Vec<ScriptEntry> {
    let lines: Vec<(usize, &str)> = script_lines(text).collect();
    let expressions: Vec<&str> = lines.iter().map(|(_, input)| *input).collect();
    let results = evaluator.evaluate_batch(memory, &expressions);

    tracing::debug!(stats = ?evaluator.cache().stats(), "batch complete");

    lines
        .into_iter()
        .zip(results)
        .map(|((line, input), result)| ScriptEntry {
            line,
            input: input.to_string(),
            result: match result {
                Ok(outcome) => EntryResult::Outcome(outcome),
                Err(err) => EntryResult::Error(ErrorReport::from(&err)),
            },
        })
        .collect()
}

/// Parses one trimmed, non-empty script line.
fn parse_line(line: usize, input: &str) -> std::result::Result<Step, CommandError> {
    let Some(directive) = input.strip_prefix(':') else {
        return Ok(Step::Request(Request::Evaluate {
            expression: input.to_string(),
        }));
    };

    let invalid = |reason: String| CommandError::InvalidDirective { line, reason };
    let (name, rest) = next_word(directive).unwrap_or((directive.trim(), ""));

    match name {
        "vars" if rest.is_empty() => Ok(Step::Vars),
        "clear" if rest.is_empty() => Ok(Step::Clear),
        "eval" => Ok(Step::Request(Request::Evaluate {
            expression: rest.to_string(),
        })),
        "calc" => {
            let (decimals, expression) = next_word(rest)
                .ok_or_else(|| invalid("expected ':calc <decimals> <expression>'".to_string()))?;
            let decimals = decimals
                .parse::<i64>()
                .map_err(|_| invalid(format!("decimals must be an integer, got '{decimals}'")))?;
            Ok(Step::Request(Request::Calculate {
                expression: expression.to_string(),
                decimals,
            }))
        }
        "draw" => {
            let usage = || invalid("expected ':draw <origin> <bound> <expression>'".to_string());
            let (origin, rest) = next_word(rest).ok_or_else(usage)?;
            let (bound, expression) = next_word(rest).ok_or_else(usage)?;
            Ok(Step::Request(Request::Draw {
                expression: expression.to_string(),
                origin: origin.to_string(),
                bound: bound.to_string(),
            }))
        }
        "vars" | "clear" => Err(invalid(format!(":{name} takes no arguments"))),
        other => Err(invalid(format!("unknown directive ':{other}'"))),
    }
}

/// Splits off the first whitespace-delimited word.
fn next_word(text: &str) -> Option<(&str, &str)> {
    text.trim_start()
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim_start()))
}
