//! Companion process for the neige Neovim extension.
//!
//! The runner attaches to a running editor over msgpack-RPC, announces its
//! channel id to the editor-side `neige` Lua module, and then serves
//! `eval_fetch` notifications: each carries a serial and the lines of a Lua
//! snippet. Snippets are evaluated in one persistent Lua environment, first
//! as an expression and, when that does not parse, as a block of statements.
//! Every outcome goes back to the editor as `[serial, [success, text]]`
//! through the module's `on_response` callback.
//!
//! The dispatch loop runs on a dedicated, supervised worker thread. Startup
//! faults, undeliverable replies and transport failures end the process with
//! a failure status; evaluation faults never do.

mod cli;
pub mod config;
pub mod dispatch;
pub mod eval;
mod health;
pub mod host;
mod process;
mod telemetry;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;

pub use config::{ConfigError, LogFormat, RunnerConfig};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, Launcher, ShutdownError};
pub use telemetry::{TelemetryError, TelemetryHandle};

use cli::Cli;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// Runs the runner with the given arguments until the host disconnects.
///
/// Help and version output go to `stdout`; usage errors and fatal
/// diagnostics go to `stderr`.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, stdout, stderr),
    };
    let config = RunnerConfig::new(cli.endpoint);
    match launch(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "neige-runner: {error}");
            ExitCode::FAILURE
        }
    }
}

fn launch(config: RunnerConfig) -> Result<(), AppError> {
    telemetry::initialise(&config)?;
    Launcher::new(config).run()?;
    Ok(())
}

fn report_usage<W, E>(error: &clap::Error, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    W: Write,
    E: Write,
{
    if error.use_stderr() {
        let _ = write!(stderr, "{}", error.render());
        ExitCode::FAILURE
    } else {
        let _ = write!(stdout, "{}", error.render());
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests;
