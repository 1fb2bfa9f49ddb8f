//! An in-process host speaking msgpack-RPC over TCP.
//!
//! The host answers the identity query and the registration call, sends its
//! scripted messages, then collects the runner's replies and closes the
//! connection once every expected answer has arrived.

use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use neige_rpc::{
    API_INFO_METHOD, Endpoint, Message, MessageReader, MessageWriter, Request, Response, Value,
};
use rmpv::encode::write_value;

use crate::dispatch::EVAL_FETCH;

const HOST_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// What the fake host does after the runner attaches.
#[derive(Debug, Clone)]
pub struct HostScript {
    channel_id: u64,
    registration_error: Option<String>,
    inbound: Vec<Value>,
    expected_replies: usize,
    expected_responses: usize,
}

impl HostScript {
    pub fn new(channel_id: u64) -> Self {
        Self {
            channel_id,
            registration_error: None,
            inbound: Vec::new(),
            expected_replies: 0,
            expected_responses: 0,
        }
    }

    /// Answers the registration call with a host error.
    pub fn reject_registration(&mut self, message: &str) {
        self.registration_error = Some(message.to_owned());
    }

    /// Queues a message sent once registration has succeeded.
    pub fn push(&mut self, message: Message) {
        match &message {
            Message::Notification(notification) if notification.method == EVAL_FETCH => {
                self.expected_replies += 1;
            }
            Message::Request(_) => self.expected_responses += 1,
            _ => {}
        }
        self.inbound.push(message.into_value());
    }

    /// Queues an arbitrary msgpack value, sent as is.
    pub fn push_raw(&mut self, value: Value) {
        self.inbound.push(value);
    }
}

/// Traffic the fake host received from the runner.
#[derive(Debug, Default)]
pub struct HostLog {
    pub identity_requested: bool,
    pub registration: Option<Request>,
    pub replies: Vec<Vec<Value>>,
    pub responses: Vec<Response>,
}

/// Handle to a fake host serving one runner connection.
pub struct FakeHost {
    endpoint: Endpoint,
    thread: JoinHandle<HostLog>,
}

impl FakeHost {
    pub fn start(script: HostScript) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind fake host");
        let port = listener.local_addr().expect("fake host address").port();
        let thread = thread::spawn(move || serve(&listener, script));
        Self {
            endpoint: Endpoint::tcp("127.0.0.1", port),
            thread,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Waits for the host to finish and returns what it saw.
    pub fn finish(self) -> HostLog {
        self.thread.join().expect("fake host panicked")
    }
}

fn serve(listener: &TcpListener, script: HostScript) -> HostLog {
    let (stream, _) = listener.accept().expect("accept runner");
    stream
        .set_read_timeout(Some(HOST_READ_TIMEOUT))
        .expect("set read timeout");
    let mut reader = MessageReader::new(stream.try_clone().expect("clone stream"));
    let mut raw = stream.try_clone().expect("clone stream");
    let mut writer = MessageWriter::new(stream);
    let mut log = HostLog::default();

    let Some(identity) = next_request(&mut reader) else {
        return log;
    };
    log.identity_requested = identity.method == API_INFO_METHOD;
    let info = Value::Array(vec![Value::from(script.channel_id), Value::Map(Vec::new())]);
    send(&mut writer, Response::success(identity.id, info).into());

    let Some(registration) = next_request(&mut reader) else {
        return log;
    };
    let id = registration.id;
    log.registration = Some(registration);
    if let Some(message) = &script.registration_error {
        let error = Value::Array(vec![Value::from(0), Value::from(message.as_str())]);
        send(&mut writer, Response::failure(id, error).into());
        return log;
    }
    send(&mut writer, Response::success(id, Value::Nil).into());

    let replies = script.expected_replies;
    let responses = script.expected_responses;
    for value in &script.inbound {
        write_value(&mut raw, value).expect("fake host raw write");
    }
    while log.replies.len() < replies || log.responses.len() < responses {
        match reader.read_message() {
            Ok(Some(Message::Notification(notification))) => log.replies.push(notification.params),
            Ok(Some(Message::Response(response))) => log.responses.push(response),
            Ok(Some(Message::Request(request))) => panic!("unexpected runner request {request:?}"),
            Ok(None) | Err(_) => break,
        }
    }
    log
}

fn next_request(reader: &mut MessageReader<TcpStream>) -> Option<Request> {
    match reader.read_message() {
        Ok(Some(Message::Request(request))) => Some(request),
        _ => None,
    }
}

fn send(writer: &mut MessageWriter<TcpStream>, message: Message) {
    writer.write_message(message).expect("fake host write");
}
