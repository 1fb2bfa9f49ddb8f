//! Lua evaluation against a persistent environment.
//!
//! Snippets arrive either as a bare expression the user wants to see the
//! value of, or as a block of statements that defines or mutates globals.
//! [`evaluate`] distinguishes the two with an explicit two-stage compile:
//!
//! 1. compile `return <source>`; if that succeeds the snippet is an
//!    expression and its values are rendered with Lua's `tostring`;
//! 2. only when stage 1 is a *syntax* error, compile the snippet as a chunk
//!    and run it for its side effects.
//!
//! Runtime faults in either mode become a failed [`EvalOutcome`]; nothing is
//! propagated to the caller.

mod environment;
mod outcome;

pub use environment::{Environment, EnvironmentError};
pub use outcome::EvalOutcome;

use mlua::{Function, MultiValue};
use tracing::debug;

pub(crate) const EVAL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::eval");

/// Chunk name shown in fault positions (`eval:1: ...`).
const CHUNK_NAME: &str = "=eval";

/// Separator between multiple returned values.
const VALUE_SEPARATOR: &str = "\t";

/// Start of the traceback Lua appends to runtime error messages.
const TRACEBACK_MARKER: &str = "\nstack traceback:";

/// Fallback text when a fault carries no message.
const UNDESCRIBED_FAULT: &str = "evaluation failed without an error message";

/// Which way a snippet compiled.
enum Compiled {
    Expression(Function),
    Statements(Function),
}

/// Evaluates `source` against `environment`.
///
/// Globals assigned by the snippet remain visible to later evaluations on the
/// same environment.
#[must_use]
pub fn evaluate(environment: &Environment, source: &str) -> EvalOutcome {
    let outcome = match compile(environment, source) {
        Ok(Compiled::Expression(function)) => run_expression(environment, &function),
        Ok(Compiled::Statements(function)) => run_statements(&function),
        Err(error) => EvalOutcome::failed(describe(&error)),
    };
    debug!(
        target: EVAL_TARGET,
        success = outcome.is_success(),
        bytes = source.len(),
        "evaluated snippet"
    );
    outcome
}

fn compile(environment: &Environment, source: &str) -> mlua::Result<Compiled> {
    let lua = environment.lua();
    let expression = format!("return {source}");
    match lua.load(expression).set_name(CHUNK_NAME).into_function() {
        Ok(function) => return Ok(Compiled::Expression(function)),
        Err(mlua::Error::SyntaxError { .. }) => {}
        Err(other) => return Err(other),
    }
    lua.load(source)
        .set_name(CHUNK_NAME)
        .into_function()
        .map(Compiled::Statements)
}

fn run_expression(environment: &Environment, function: &Function) -> EvalOutcome {
    let rendered = function
        .call::<MultiValue>(())
        .and_then(|values| render(environment, values));
    match rendered {
        Ok(text) => EvalOutcome::succeeded(text),
        Err(error) => EvalOutcome::failed(describe(&error)),
    }
}

fn run_statements(function: &Function) -> EvalOutcome {
    match function.call::<MultiValue>(()) {
        Ok(_) => EvalOutcome::succeeded(String::new()),
        Err(error) => EvalOutcome::failed(describe(&error)),
    }
}

/// Renders returned values; no values or a lone `nil` render as empty text.
fn render(environment: &Environment, values: MultiValue) -> mlua::Result<String> {
    let values: Vec<mlua::Value> = values.into_iter().collect();
    if matches!(values.as_slice(), [] | [mlua::Value::Nil]) {
        return Ok(String::new());
    }
    let rendered = values
        .into_iter()
        .map(|value| environment.to_display_string(value))
        .collect::<mlua::Result<Vec<_>>>()?;
    Ok(rendered.join(VALUE_SEPARATOR))
}

/// Renders a fault as the message Lua raised, without the stack traceback.
fn describe(error: &mlua::Error) -> String {
    let text = match error {
        mlua::Error::RuntimeError(message) | mlua::Error::SyntaxError { message, .. } => {
            strip_traceback(message).to_owned()
        }
        mlua::Error::CallbackError { cause, .. } => describe(cause),
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        UNDESCRIBED_FAULT.to_owned()
    } else {
        text
    }
}

fn strip_traceback(message: &str) -> &str {
    message
        .split_once(TRACEBACK_MARKER)
        .map_or(message, |(head, _)| head)
        .trim_end()
}
