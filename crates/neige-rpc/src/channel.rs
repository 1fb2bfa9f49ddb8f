//! The seam between host-facing logic and the transport.

use std::fmt;

use rmpv::Value;

use crate::errors::RpcError;
use crate::message::{Message, MessageId};

/// Identity the host assigned to this connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

impl ChannelId {
    /// Wraps a raw channel id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer handle.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<ChannelId> for Value {
    fn from(id: ChannelId) -> Self {
        Self::from(id.0)
    }
}

/// Operations available on an attached host connection.
///
/// [`Session`](crate::Session) is the production implementation; tests
/// provide scripted channels.
pub trait HostChannel {
    /// Identity of this connection as seen by the host.
    fn channel_id(&self) -> ChannelId;

    /// Issues a request and blocks until the correlated response arrives.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Remote`] when the host answers with an error,
    /// [`RpcError::Disconnected`] when the connection closes first, or a
    /// transport error.
    fn call(&mut self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;

    /// Sends a notification without waiting for any acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the message cannot be written.
    fn notify(&mut self, method: &str, params: Vec<Value>) -> Result<(), RpcError>;

    /// Answers a request the host issued.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the response cannot be written.
    fn respond(&mut self, id: MessageId, outcome: Result<Value, Value>) -> Result<(), RpcError>;

    /// Receives the next host-initiated message, blocking until one arrives.
    ///
    /// Returns `Ok(None)` once the host has closed the connection.
    ///
    /// # Errors
    ///
    /// Returns a transport error when reading or decoding fails.
    fn next_message(&mut self) -> Result<Option<Message>, RpcError>;
}

impl<T> HostChannel for Box<T>
where
    T: HostChannel + ?Sized,
{
    fn channel_id(&self) -> ChannelId {
        (**self).channel_id()
    }

    fn call(&mut self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        (**self).call(method, params)
    }

    fn notify(&mut self, method: &str, params: Vec<Value>) -> Result<(), RpcError> {
        (**self).notify(method, params)
    }

    fn respond(&mut self, id: MessageId, outcome: Result<Value, Value>) -> Result<(), RpcError> {
        (**self).respond(id, outcome)
    }

    fn next_message(&mut self) -> Result<Option<Message>, RpcError> {
        (**self).next_message()
    }
}
