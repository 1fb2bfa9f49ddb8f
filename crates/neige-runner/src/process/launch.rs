//! Supervises runner launch sequencing and the dispatch worker's lifetime.

use std::sync::Arc;

use neige_rpc::{HostChannel, Session};
use tracing::info;

use crate::config::RunnerConfig;
use crate::dispatch::{DispatchSummary, DispatchWorker};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::host::{HostExtension, register_channel};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::SignalWatcher;

/// Runs the attach, register and dispatch sequence.
///
/// The worker only starts once registration has succeeded, and the launcher
/// joins it before returning.
pub struct Launcher {
    config: RunnerConfig,
    reporter: Arc<dyn HealthReporter>,
    handle_signals: bool,
}

impl Launcher {
    /// Builds a launcher with the structured health reporter and signal
    /// handling enabled.
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            reporter: Arc::new(StructuredHealthReporter::new()),
            handle_signals: true,
        }
    }

    /// Replaces the health reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn HealthReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Leaves termination signals at their default disposition.
    #[must_use]
    pub fn without_signal_handlers(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    /// Attaches, registers and runs the dispatch loop until the host closes
    /// the connection.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] for any startup fault, or
    /// [`LaunchError::Dispatch`] when the loop ends with a fatal error.
    pub fn run(self) -> Result<DispatchSummary, LaunchError> {
        let (worker, watcher) = match self.start() {
            Ok(started) => started,
            Err(error) => {
                self.reporter.startup_failed(&error);
                return Err(error);
            }
        };
        self.reporter.worker_started();

        let result = worker.join();
        if let Some(watcher) = watcher {
            watcher.stop();
        }
        match result {
            Ok(summary) => {
                self.reporter.worker_stopped(&summary);
                info!(target: PROCESS_TARGET, "shutdown sequence completed");
                Ok(summary)
            }
            Err(error) => {
                self.reporter.worker_failed(&error);
                Err(LaunchError::Dispatch(error))
            }
        }
    }

    fn start(&self) -> Result<(DispatchWorker, Option<SignalWatcher>), LaunchError> {
        self.config.validate()?;
        let endpoint = self.config.endpoint();
        let extension = HostExtension::new(self.config.extension());

        self.reporter.attach_starting(endpoint);
        let mut session = Session::attach(endpoint).map_err(|source| LaunchError::Attach {
            endpoint: endpoint.clone(),
            source,
        })?;
        self.reporter.attached(session.channel_id());

        register_channel(&mut session, &extension)?;
        self.reporter.registration_succeeded(extension.name());

        let watcher = if self.handle_signals {
            let connection = session
                .shutdown_handle()
                .map_err(|source| LaunchError::ShutdownHandle { source })?;
            Some(SignalWatcher::install(connection)?)
        } else {
            None
        };

        match DispatchWorker::spawn(session, &extension) {
            Ok(worker) => Ok((worker, watcher)),
            Err(source) => {
                if let Some(watcher) = watcher {
                    watcher.stop();
                }
                Err(LaunchError::Spawn { source })
            }
        }
    }
}
