use std::io;
use std::thread::{self, JoinHandle};

use neige_rpc::ShutdownHandle;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use thiserror::Error;
use tracing::{info, warn};

use super::PROCESS_TARGET;

const SHUTDOWN_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];
const WATCHER_THREAD_NAME: &str = "neige-signals";

/// Errors reported by the shutdown signal watcher.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The watcher thread could not be started.
    #[error("failed to spawn signal watcher: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Closes the host connection when a termination signal arrives.
///
/// Closing the socket makes the dispatch worker observe end of stream, so
/// the normal join path handles shutdown.
pub(crate) struct SignalWatcher {
    handle: Handle,
    thread: JoinHandle<()>,
}

impl SignalWatcher {
    pub(crate) fn install(connection: ShutdownHandle) -> Result<Self, ShutdownError> {
        let mut signals =
            Signals::new(SHUTDOWN_SIGNALS).map_err(|source| ShutdownError::Install { source })?;
        let handle = signals.handle();
        let thread = thread::Builder::new()
            .name(WATCHER_THREAD_NAME.to_owned())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    info!(target: PROCESS_TARGET, signal, "shutdown signal received");
                    if let Err(error) = connection.shutdown() {
                        warn!(
                            target: PROCESS_TARGET,
                            error = %error,
                            "failed to close host connection"
                        );
                    }
                }
            })
            .map_err(|source| ShutdownError::Spawn { source })?;
        Ok(Self { handle, thread })
    }

    /// Stops watching and waits for the watcher thread.
    pub(crate) fn stop(self) {
        self.handle.close();
        if self.thread.join().is_err() {
            warn!(target: PROCESS_TARGET, "signal watcher panicked");
        }
    }
}
