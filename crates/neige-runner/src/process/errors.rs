//! Defines the unified error surface for runner launch and supervision.

use neige_rpc::{ConnectError, Endpoint, RpcError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::dispatch::DispatchError;
use crate::host::RegistrationError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the runner.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Attaching to the host failed.
    #[error("failed to attach to host at {endpoint}: {source}")]
    Attach {
        /// Endpoint that was dialled.
        endpoint: Endpoint,
        /// Underlying transport error.
        #[source]
        source: RpcError,
    },
    /// The host extension did not accept the channel id.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    /// The connection could not be duplicated for shutdown control.
    #[error("failed to prepare connection shutdown control: {source}")]
    ShutdownHandle {
        /// Underlying socket error.
        #[source]
        source: ConnectError,
    },
    /// Signal handling could not be installed.
    #[error(transparent)]
    Signals(#[from] ShutdownError),
    /// The dispatch worker could not be started.
    #[error("failed to start dispatch worker: {source}")]
    Spawn {
        /// Underlying dispatch error.
        #[source]
        source: DispatchError,
    },
    /// The dispatch loop ended with a fatal error.
    #[error("dispatch loop failed: {0}")]
    Dispatch(#[source] DispatchError),
}
