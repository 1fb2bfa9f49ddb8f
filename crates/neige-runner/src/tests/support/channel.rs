//! In-memory [`HostChannel`] fed from a fixed list of inbound messages.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use neige_rpc::{
    ChannelId, CodecError, HostChannel, Message, MessageError, MessageId, Notification, RpcError,
    Value,
};

use crate::dispatch::EVAL_FETCH;

/// A message the runner sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub method: String,
    pub params: Vec<Value>,
}

/// Everything written to a [`ScriptedChannel`].
#[derive(Debug, Default)]
pub struct Transcript {
    pub calls: Vec<Sent>,
    pub notifications: Vec<Sent>,
    pub responses: Vec<(MessageId, Result<Value, Value>)>,
}

/// Channel that replays inbound messages and records outbound traffic.
///
/// Once the script is exhausted the channel reports a closed connection.
#[derive(Debug)]
pub struct ScriptedChannel {
    channel_id: ChannelId,
    inbound: VecDeque<Result<Message, RpcError>>,
    transcript: Arc<Mutex<Transcript>>,
    call_error: Option<String>,
    notify_budget: Option<usize>,
}

impl ScriptedChannel {
    pub fn new(inbound: impl IntoIterator<Item = Message>) -> Self {
        Self::from_reads(inbound.into_iter().map(Ok))
    }

    /// A channel whose reads yield `reads` in order, errors included.
    pub fn from_reads(reads: impl IntoIterator<Item = Result<Message, RpcError>>) -> Self {
        Self {
            channel_id: ChannelId::new(3),
            inbound: reads.into_iter().collect(),
            transcript: Arc::new(Mutex::new(Transcript::default())),
            call_error: None,
            notify_budget: None,
        }
    }

    /// A channel with nothing to deliver.
    pub fn idle() -> Self {
        Self::new(Vec::<Message>::new())
    }

    pub fn with_channel_id(mut self, raw: u64) -> Self {
        self.channel_id = ChannelId::new(raw);
        self
    }

    /// Makes every `call` fail as if the host returned `message`.
    pub fn rejecting_calls(mut self, message: &str) -> Self {
        self.call_error = Some(message.to_owned());
        self
    }

    /// Lets `count` notifications through, then fails with a broken pipe.
    pub fn breaking_after_notifications(mut self, count: usize) -> Self {
        self.notify_budget = Some(count);
        self
    }

    /// Shared handle to the recorded traffic.
    pub fn transcript(&self) -> Arc<Mutex<Transcript>> {
        Arc::clone(&self.transcript)
    }

    fn record(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().expect("transcript mutex poisoned")
    }
}

impl HostChannel for ScriptedChannel {
    fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    fn call(&mut self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.record().calls.push(Sent {
            method: method.to_owned(),
            params,
        });
        match &self.call_error {
            Some(message) => Err(RpcError::Remote {
                method: method.to_owned(),
                message: message.clone(),
            }),
            None => Ok(Value::Nil),
        }
    }

    fn notify(&mut self, method: &str, params: Vec<Value>) -> Result<(), RpcError> {
        if let Some(budget) = self.notify_budget.as_mut() {
            if *budget == 0 {
                return Err(RpcError::Codec(CodecError::Io(io::Error::from(
                    io::ErrorKind::BrokenPipe,
                ))));
            }
            *budget -= 1;
        }
        self.record().notifications.push(Sent {
            method: method.to_owned(),
            params,
        });
        Ok(())
    }

    fn respond(&mut self, id: MessageId, outcome: Result<Value, Value>) -> Result<(), RpcError> {
        self.record().responses.push((id, outcome));
        Ok(())
    }

    fn next_message(&mut self) -> Result<Option<Message>, RpcError> {
        self.inbound.pop_front().transpose()
    }
}

/// Builds an `eval_fetch` notification for `serial` with the given lines.
pub fn eval_fetch(serial: i64, lines: &[&str]) -> Message {
    let lines = lines.iter().map(|line| Value::from(*line)).collect();
    Notification::new(
        EVAL_FETCH,
        vec![Value::Array(vec![Value::from(serial), Value::Array(lines)])],
    )
    .into()
}

/// A read failure for a value that decoded but is not an envelope.
pub fn invalid_envelope() -> RpcError {
    RpcError::Codec(CodecError::Message(MessageError::InvalidField {
        kind: "notification",
        field: "params",
        expected: "an array",
    }))
}

/// Extracts `(serial, [success, text])` pairs from recorded reply params.
pub fn reply_pairs<'a>(params: impl IntoIterator<Item = &'a Vec<Value>>) -> Vec<(Value, Value)> {
    params
        .into_iter()
        .map(|params| {
            let args = params
                .get(1)
                .and_then(Value::as_array)
                .expect("reply arguments array");
            match args.as_slice() {
                [serial, result] => (serial.clone(), result.clone()),
                other => panic!("unexpected reply arguments: {other:?}"),
            }
        })
        .collect()
}
