//! Calls into the host's extension module.
//!
//! The runner never edits host state directly. Both the one-off
//! registration and the per-evaluation reply are Lua scripts executed by the
//! host through `nvim_exec_lua`, each resolving the extension module by name.

mod extension;
mod registration;
mod reply;

pub use extension::{EXEC_LUA_METHOD, HostExtension};
pub use registration::{RegistrationError, register_channel};
pub use reply::{ReplyEmitter, ReplyError};

pub(crate) const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");
