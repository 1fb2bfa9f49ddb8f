//! Supervised thread running the dispatch loop.

use std::thread::{self, JoinHandle};

use neige_rpc::HostChannel;
use tracing::debug;

use super::DISPATCH_TARGET;
use super::dispatcher::{DispatchSummary, Dispatcher};
use super::errors::DispatchError;
use crate::eval::Environment;
use crate::host::{HostExtension, ReplyEmitter};

/// Name given to the dispatch thread.
pub const WORKER_THREAD_NAME: &str = "neige-dispatch";

/// Handle to the running dispatch loop.
///
/// The Lua environment is created inside the worker thread and never leaves
/// it. Callers must [`join`](Self::join) the worker to learn how the loop
/// ended.
#[derive(Debug)]
pub struct DispatchWorker {
    handle: JoinHandle<Result<DispatchSummary, DispatchError>>,
}

impl DispatchWorker {
    /// Moves `channel` onto a new thread and starts dispatching.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Spawn`] when the thread cannot be created.
    pub fn spawn<C>(channel: C, extension: &HostExtension) -> Result<Self, DispatchError>
    where
        C: HostChannel + Send + 'static,
    {
        let emitter = ReplyEmitter::new(extension);
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_owned())
            .spawn(move || {
                let environment = Environment::new()?;
                debug!(target: DISPATCH_TARGET, "dispatch worker started");
                Dispatcher::new(channel, environment, emitter).run()
            })
            .map_err(|source| DispatchError::Spawn { source })?;
        Ok(Self { handle })
    }

    /// Whether the loop has already returned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the loop to end.
    ///
    /// # Errors
    ///
    /// Returns the loop's fatal error, or [`DispatchError::WorkerPanicked`]
    /// when the thread panicked.
    pub fn join(self) -> Result<DispatchSummary, DispatchError> {
        self.handle
            .join()
            .map_err(|_| DispatchError::WorkerPanicked)?
    }
}
