//! Binary entrypoint for the neige runner.
//!
//! Standard streams are not locked here: telemetry writes to stderr from the
//! dispatch worker while `run` is still in progress.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    neige_runner::run(std::env::args_os(), &mut stdout, &mut stderr)
}
