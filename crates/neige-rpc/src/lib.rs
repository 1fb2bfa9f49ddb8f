//! Msgpack-RPC plumbing for attaching to an editor host.
//!
//! The crate owns everything needed to talk to a Neovim-style host over its
//! listen socket: parsing the endpoint handed to the process on startup,
//! connecting the stream, encoding and decoding msgpack-RPC envelopes, and a
//! blocking [`Session`] that correlates requests with their responses.
//!
//! Higher-level crates talk to the host through the [`HostChannel`] trait so
//! tests can swap the real session for scripted doubles without opening a
//! socket.
//!
//! ## Wire format
//!
//! ```text
//! [0, msgid, method, params]   request
//! [1, msgid, error, result]    response
//! [2, method, params]          notification
//! ```

mod channel;
mod codec;
mod endpoint;
mod errors;
mod message;
mod session;
mod stream;

pub use channel::{ChannelId, HostChannel};
pub use codec::{MessageReader, MessageWriter};
pub use endpoint::{Endpoint, EndpointParseError};
pub use errors::{CodecError, ConnectError, MessageError, RpcError};
pub use message::{Message, MessageId, Notification, Request, Response};
pub use rmpv::Value;
pub use session::{API_INFO_METHOD, Session};
pub use stream::{ConnectionStream, ShutdownHandle};

pub(crate) const RPC_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::rpc");
