//! Error types for host attachment and msgpack-RPC messaging.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while connecting to the host endpoint.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Host name resolution failed.
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        /// Host name that failed to resolve.
        host: String,
        /// Requested port.
        port: u16,
        /// Underlying resolver error.
        #[source]
        source: io::Error,
    },
    /// Resolution succeeded but produced no addresses.
    #[error("no TCP addresses resolved for {host}:{port}")]
    ResolveEmpty {
        /// Host name that resolved to nothing.
        host: String,
        /// Requested port.
        port: u16,
    },
    /// Every resolved TCP address refused the connection.
    #[error("failed to connect to TCP endpoint {addr}: {source}")]
    Tcp {
        /// Last address attempted.
        addr: SocketAddr,
        /// Error reported for that address.
        #[source]
        source: io::Error,
    },
    /// Connecting to the Unix socket failed.
    #[error("failed to connect to unix socket {path}: {source}")]
    Unix {
        /// Socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Unix sockets are not available on this platform.
    #[error("unix sockets are unsupported for endpoint {endpoint}")]
    UnsupportedUnix {
        /// Rendered endpoint.
        endpoint: String,
    },
    /// Splitting the stream into reader and writer halves failed.
    #[error("failed to clone connection stream: {source}")]
    Clone {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Errors raised when a decoded value is not a valid msgpack-RPC envelope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    /// The envelope is not an array.
    #[error("message envelope is not an array")]
    NotArray,
    /// The envelope array is empty.
    #[error("message envelope is empty")]
    Empty,
    /// The leading kind tag is not 0, 1 or 2.
    #[error("unknown message kind {kind}")]
    UnknownKind {
        /// Rendered kind value.
        kind: String,
    },
    /// The envelope has the wrong number of elements for its kind.
    #[error("{kind} envelope has {found} elements, expected {expected}")]
    Arity {
        /// Message kind name.
        kind: &'static str,
        /// Expected element count.
        expected: usize,
        /// Actual element count.
        found: usize,
    },
    /// A field has the wrong type.
    #[error("{kind} field '{field}' is invalid: expected {expected}")]
    InvalidField {
        /// Message kind name.
        kind: &'static str,
        /// Field name.
        field: &'static str,
        /// Description of the expected type.
        expected: &'static str,
    },
}

/// Errors raised while reading or writing framed messages.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Writing or flushing the stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The byte stream is not valid msgpack.
    #[error("failed to decode msgpack value: {0}")]
    Decode(#[from] rmpv::decode::Error),
    /// Encoding a value failed.
    #[error("failed to encode msgpack value: {0}")]
    Encode(#[from] rmpv::encode::Error),
    /// The decoded value is not a msgpack-RPC message.
    #[error("invalid msgpack-RPC message: {0}")]
    Message(#[from] MessageError),
}

/// Errors surfaced by [`HostChannel`](crate::HostChannel) operations.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The endpoint could not be reached.
    #[error(transparent)]
    Connect(#[from] ConnectError),
    /// Reading or writing a message failed.
    #[error("transport error: {0}")]
    Codec(#[from] CodecError),
    /// The host closed the connection before answering a request.
    #[error("host closed the connection while awaiting '{method}'")]
    Disconnected {
        /// Method of the unanswered request.
        method: String,
    },
    /// The host answered a request with an error.
    #[error("host rejected '{method}': {message}")]
    Remote {
        /// Method of the rejected request.
        method: String,
        /// Error text reported by the host.
        message: String,
    },
    /// The host's identity answer did not contain a channel id.
    #[error("host returned a malformed channel identity: {message}")]
    ChannelIdentity {
        /// Description of what was received.
        message: String,
    },
}

impl From<io::Error> for RpcError {
    fn from(source: io::Error) -> Self {
        Self::Codec(CodecError::Io(source))
    }
}
