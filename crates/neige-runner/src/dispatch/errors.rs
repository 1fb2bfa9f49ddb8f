//! Errors surfaced by the dispatch loop and its worker.
//!
//! Only some variants end the loop. Unsupported notifications, envelopes
//! that are not msgpack-RPC messages and malformed payloads are reported and
//! the offending message is dropped. Transport failures, undeliverable
//! replies and worker faults are fatal.

use std::io;

use neige_rpc::{MessageError, RpcError};
use thiserror::Error;

use super::request::RequestError;
use crate::eval::EnvironmentError;
use crate::host::ReplyError;

/// Errors surfaced while dispatching host messages.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A notification carried a type tag the runner does not handle.
    #[error("unsupported notification '{method}'")]
    UnsupportedNotification {
        /// The unrecognised tag.
        method: String,
    },
    /// A well-formed msgpack value was not a msgpack-RPC message.
    #[error("invalid message envelope: {0}")]
    InvalidEnvelope(#[source] MessageError),
    /// An `eval_fetch` payload could not be parsed.
    #[error("malformed eval request: {0}")]
    MalformedRequest(#[from] RequestError),
    /// An outcome could not be delivered to the host.
    #[error(transparent)]
    ReplyDelivery(#[from] ReplyError),
    /// Reading from or writing to the host failed.
    #[error("host transport failed: {0}")]
    Transport(#[from] RpcError),
    /// The Lua environment could not be prepared.
    #[error("failed to prepare evaluation environment: {0}")]
    Environment(#[from] EnvironmentError),
    /// The worker thread could not be started.
    #[error("failed to spawn dispatch worker: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The worker thread panicked.
    #[error("dispatch worker panicked")]
    WorkerPanicked,
}

impl DispatchError {
    /// Whether the loop can continue after this error.
    #[must_use]
    pub fn is_per_message(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedNotification { .. }
                | Self::InvalidEnvelope(_)
                | Self::MalformedRequest(_)
        )
    }
}
