//! Blocking msgpack-RPC session with an attached host.

use std::collections::VecDeque;
use std::io::{BufReader, BufWriter};

use rmpv::Value;
use tracing::{debug, warn};

use crate::RPC_TARGET;
use crate::channel::{ChannelId, HostChannel};
use crate::codec::{MessageReader, MessageWriter};
use crate::endpoint::Endpoint;
use crate::errors::{ConnectError, RpcError};
use crate::message::{Message, MessageId, Notification, Request, Response};
use crate::stream::{ConnectionStream, ShutdownHandle};

/// Host API method whose result starts with this connection's channel id.
pub const API_INFO_METHOD: &str = "nvim_get_api_info";

/// An attached connection to the host.
///
/// The session is single-threaded: [`HostChannel::call`] reads the stream
/// until the correlated response arrives, and every host-initiated message
/// seen meanwhile is queued so [`HostChannel::next_message`] later yields it
/// in arrival order.
#[derive(Debug)]
pub struct Session {
    reader: MessageReader<BufReader<ConnectionStream>>,
    writer: MessageWriter<BufWriter<ConnectionStream>>,
    control: ConnectionStream,
    backlog: VecDeque<Message>,
    next_request_id: MessageId,
    channel_id: ChannelId,
}

impl Session {
    /// Connects to the endpoint and queries this connection's identity.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Connect`] when the endpoint is unreachable and
    /// [`RpcError::ChannelIdentity`] when the host's answer carries no
    /// channel id.
    pub fn attach(endpoint: &Endpoint) -> Result<Self, RpcError> {
        let stream = ConnectionStream::connect(endpoint)?;
        Self::attach_stream(stream)
    }

    /// Performs the identity query over an already connected stream.
    ///
    /// # Errors
    ///
    /// See [`Session::attach`].
    pub fn attach_stream(stream: ConnectionStream) -> Result<Self, RpcError> {
        let clone = |stream: &ConnectionStream| {
            stream
                .try_clone()
                .map_err(|source| ConnectError::Clone { source })
        };
        let reader = clone(&stream)?;
        let control = clone(&stream)?;
        let mut session = Self {
            reader: MessageReader::new(BufReader::new(reader)),
            writer: MessageWriter::new(BufWriter::new(stream)),
            control,
            backlog: VecDeque::new(),
            next_request_id: 1,
            channel_id: ChannelId::new(0),
        };

        let api_info = session.call(API_INFO_METHOD, Vec::new())?;
        session.channel_id = parse_channel_id(&api_info)?;
        debug!(
            target: RPC_TARGET,
            channel_id = session.channel_id.get(),
            "attached to host"
        );
        Ok(session)
    }

    /// Returns a handle that can close the connection from another thread.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::Clone`] when the socket cannot be duplicated.
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle, ConnectError> {
        self.control
            .try_clone()
            .map(ShutdownHandle::new)
            .map_err(|source| ConnectError::Clone { source })
    }

    fn allocate_request_id(&mut self) -> MessageId {
        let id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        id
    }

    fn await_response(&mut self, method: &str, id: MessageId) -> Result<Response, RpcError> {
        loop {
            let Some(message) = self.reader.read_message()? else {
                return Err(RpcError::Disconnected {
                    method: method.to_owned(),
                });
            };
            match message {
                Message::Response(response) if response.id == id => return Ok(response),
                Message::Response(response) => {
                    warn!(
                        target: RPC_TARGET,
                        expected = id,
                        received = response.id,
                        "skipping response with non-matching id"
                    );
                }
                other => {
                    debug!(
                        target: RPC_TARGET,
                        kind = other.kind(),
                        awaiting = method,
                        "queueing host message received while awaiting response"
                    );
                    self.backlog.push_back(other);
                }
            }
        }
    }
}

impl HostChannel for Session {
    fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    fn call(&mut self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let id = self.allocate_request_id();
        debug!(target: RPC_TARGET, method, id, "sending request");
        self.writer
            .write_message(Request::new(id, method, params).into())?;
        let response = self.await_response(method, id)?;
        response.into_result().map_err(|error| RpcError::Remote {
            method: method.to_owned(),
            message: describe_remote_error(&error),
        })
    }

    fn notify(&mut self, method: &str, params: Vec<Value>) -> Result<(), RpcError> {
        debug!(target: RPC_TARGET, method, "sending notification");
        self.writer
            .write_message(Notification::new(method, params).into())?;
        Ok(())
    }

    fn respond(&mut self, id: MessageId, outcome: Result<Value, Value>) -> Result<(), RpcError> {
        let response = match outcome {
            Ok(result) => Response::success(id, result),
            Err(error) => Response::failure(id, error),
        };
        self.writer.write_message(response.into())?;
        Ok(())
    }

    fn next_message(&mut self) -> Result<Option<Message>, RpcError> {
        if let Some(message) = self.backlog.pop_front() {
            return Ok(Some(message));
        }
        Ok(self.reader.read_message()?)
    }
}

fn parse_channel_id(api_info: &Value) -> Result<ChannelId, RpcError> {
    let first = api_info
        .as_array()
        .and_then(|elements| elements.first())
        .ok_or_else(|| RpcError::ChannelIdentity {
            message: format!("expected [channel_id, metadata], got {api_info}"),
        })?;
    first
        .as_u64()
        .filter(|id| *id > 0)
        .map(ChannelId::new)
        .ok_or_else(|| RpcError::ChannelIdentity {
            message: format!("channel id {first} is not a positive integer"),
        })
}

/// Renders a host error value.
///
/// Neovim reports errors as `[error_type, message]`; anything else is shown
/// verbatim.
fn describe_remote_error(error: &Value) -> String {
    error
        .as_array()
        .and_then(|parts| parts.get(1))
        .and_then(Value::as_str)
        .map_or_else(|| error.to_string(), str::to_owned)
}
