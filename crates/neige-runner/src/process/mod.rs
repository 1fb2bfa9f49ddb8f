//! Launch sequencing and supervision of the runner process.

mod errors;
mod launch;
mod shutdown;

pub use errors::LaunchError;
pub use launch::Launcher;
pub use shutdown::ShutdownError;

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
