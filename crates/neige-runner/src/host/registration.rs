//! Announces the runner's channel to the host extension.

use neige_rpc::{HostChannel, RpcError, Value};
use thiserror::Error;
use tracing::info;

use super::HOST_TARGET;
use super::extension::{EXEC_LUA_METHOD, HostExtension};

/// Registration failed, usually because the extension is not loaded.
#[derive(Debug, Error)]
#[error("failed to register channel {channel_id} with host extension '{extension}': {source}")]
pub struct RegistrationError {
    /// Extension module the script targeted.
    pub extension: String,
    /// Channel id that was being announced.
    pub channel_id: u64,
    /// Transport or remote failure.
    #[source]
    pub source: RpcError,
}

/// Runs the registration script and waits for the host to finish it.
///
/// The script's return value is ignored.
///
/// # Errors
///
/// Returns [`RegistrationError`] when the call cannot be delivered or the
/// host reports an error while running the script.
pub fn register_channel<C>(
    channel: &mut C,
    extension: &HostExtension,
) -> Result<(), RegistrationError>
where
    C: HostChannel + ?Sized,
{
    let channel_id = channel.channel_id();
    let params = HostExtension::exec_params(
        extension.registration_script(),
        vec![Value::from(channel_id)],
    );
    channel
        .call(EXEC_LUA_METHOD, params)
        .map_err(|source| RegistrationError {
            extension: extension.name().to_owned(),
            channel_id: channel_id.get(),
            source,
        })?;
    info!(
        target: HOST_TARGET,
        channel_id = channel_id.get(),
        extension = extension.name(),
        "registered channel with host extension"
    );
    Ok(())
}
