//! Delivers evaluation outcomes to the host extension.

use neige_rpc::{HostChannel, RpcError, Value};
use thiserror::Error;
use tracing::debug;

use super::HOST_TARGET;
use super::extension::{EXEC_LUA_METHOD, HostExtension};
use crate::eval::EvalOutcome;

/// A reply could not be written to the host.
#[derive(Debug, Error)]
#[error("failed to deliver reply for serial {serial}: {source}")]
pub struct ReplyError {
    /// Correlation token of the undelivered reply.
    pub serial: Value,
    /// Transport failure.
    #[source]
    pub source: RpcError,
}

/// Sends `[serial, [success, text]]` to the extension's `on_response`.
///
/// Replies are notifications: the host runs the script without producing a
/// response, so the emitter never waits. Script failures on the host side
/// come back later as `nvim_error_event` notifications.
#[derive(Debug, Clone)]
pub struct ReplyEmitter {
    script: String,
}

impl ReplyEmitter {
    /// Builds an emitter targeting `extension`.
    #[must_use]
    pub fn new(extension: &HostExtension) -> Self {
        Self {
            script: extension.response_script(),
        }
    }

    /// Delivers one outcome, echoing `serial` unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError`] when the notification cannot be written.
    pub fn emit<C>(
        &self,
        channel: &mut C,
        serial: Value,
        outcome: &EvalOutcome,
    ) -> Result<(), ReplyError>
    where
        C: HostChannel + ?Sized,
    {
        let args = vec![serial.clone(), outcome.to_value()];
        let params = HostExtension::exec_params(self.script.clone(), args);
        channel
            .notify(EXEC_LUA_METHOD, params)
            .map_err(|source| ReplyError { serial: serial.clone(), source })?;
        debug!(
            target: HOST_TARGET,
            serial = %serial,
            success = outcome.is_success(),
            "delivered evaluation reply"
        );
        Ok(())
    }
}
