//! Run command implementation.
//!
//! A script holds one invocation per line, in the form
//!
//! ```text
//! {"Args":["create","p1","blue","35","tom"]}
//! ```
//!
//! The first element is the operation name, the rest are its arguments.
//! Blank lines and lines starting with `#` are skipped. All invocations run
//! in order against one store.

use picledger_core::{Ledger, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Script errors.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A line is not a valid invocation.
    #[error("line {line}: invalid invocation: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// An invocation has no operation name.
    #[error("line {line}: invocation has no operation name")]
    MissingFunction {
        /// 1-based line number.
        line: usize,
    },

    /// An invocation failed while running in strict mode.
    #[error("line {line}: {function} failed: {message}")]
    Failed {
        /// 1-based line number.
        line: usize,
        /// Operation name.
        function: String,
        /// Error message from the response.
        message: String,
    },

    /// Reading the script or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Invocation {
    /// 1-based line number in the script.
    #[serde(skip)]
    pub line: usize,
    /// Operation name followed by its arguments.
    #[serde(rename = "Args")]
    pub args: Vec<String>,
}

impl Invocation {
    /// Returns the operation name.
    pub fn function(&self) -> &str {
        self.args.first().map_or("", String::as_str)
    }

    /// Returns the operation arguments.
    pub fn arguments(&self) -> &[String] {
        self.args.get(1..).unwrap_or_default()
    }
}

/// Options for the run command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Emit one JSON object per invocation instead of text.
    pub json: bool,
    /// Stop at the first failed invocation.
    pub strict: bool,
}

/// Counts of a finished script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Invocations that returned status 200.
    pub succeeded: usize,
    /// Invocations that returned an error.
    pub failed: usize,
}

#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    line: usize,
    function: &'a str,
    status: u16,
    #[serde(skip_serializing_if = "str::is_empty")]
    message: &'a str,
    payload: Value,
}

/// Parses a script into invocations.
pub fn parse_script(text: &str) -> Result<Vec<Invocation>, ScriptError> {
    let mut invocations = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut invocation: Invocation = serde_json::from_str(trimmed)
            .map_err(|source| ScriptError::Parse { line, source })?;
        if invocation.args.is_empty() {
            return Err(ScriptError::MissingFunction { line });
        }
        invocation.line = line;
        invocations.push(invocation);
    }
    Ok(invocations)
}

/// Runs `invocations` in order, writing one report per invocation to `out`.
pub fn execute<W: Write>(
    ledger: &Ledger,
    invocations: &[Invocation],
    options: &RunOptions,
    out: &mut W,
) -> Result<RunSummary, ScriptError> {
    let mut summary = RunSummary::default();

    for invocation in invocations {
        debug!(line = invocation.line, function = %invocation.function(), "running invocation");
        let response = ledger.invoke(invocation.function(), invocation.arguments());

        if options.json {
            write_json(out, invocation, &response)?;
        } else {
            write_text(out, invocation, &response)?;
        }

        if response.is_ok() {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
            if options.strict {
                return Err(ScriptError::Failed {
                    line: invocation.line,
                    function: invocation.function().to_string(),
                    message: response.message,
                });
            }
        }
    }

    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "script finished"
    );
    Ok(summary)
}

/// Runs the run command against `ledger`, reading the script from `path`
/// or from stdin.
pub fn run(
    ledger: &Ledger,
    path: Option<&Path>,
    options: &RunOptions,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read script {}: {e}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let invocations = parse_script(&text)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = execute(ledger, &invocations, options, &mut out)?;
    out.flush()?;
    Ok(summary)
}

fn write_text<W: Write>(
    out: &mut W,
    invocation: &Invocation,
    response: &Response,
) -> io::Result<()> {
    writeln!(
        out,
        "[{}] {} {}",
        invocation.line,
        invocation.function(),
        invocation.arguments().join(" ")
    )?;
    if response.is_ok() {
        if response.payload.is_empty() {
            writeln!(out, "  {} OK", response.status)
        } else {
            writeln!(out, "  {} {}", response.status, response.payload_text())
        }
    } else {
        writeln!(out, "  {} {}", response.status, response.message)
    }
}

fn write_json<W: Write>(
    out: &mut W,
    invocation: &Invocation,
    response: &Response,
) -> io::Result<()> {
    let payload = if response.payload.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&response.payload)
            .unwrap_or_else(|_| Value::String(response.payload_text()))
    };
    let line = JsonLine {
        line: invocation.line,
        function: invocation.function(),
        status: response.status,
        message: &response.message,
        payload,
    };
    serde_json::to_writer(&mut *out, &line)?;
    writeln!(out)
}
