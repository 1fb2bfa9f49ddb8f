//! Classifies inbound host messages and drives evaluations.

use neige_rpc::{
    CodecError, HostChannel, Message, Notification, Request, Response, RpcError, Value,
};
use tracing::{debug, error, info, warn};

use super::DISPATCH_TARGET;
use super::errors::DispatchError;
use super::request::{EvalRequest, RequestError};
use crate::eval::{self, Environment, EvalOutcome};
use crate::host::ReplyEmitter;

/// Notification tag carrying an evaluation request.
pub const EVAL_FETCH: &str = "eval_fetch";

/// Notification the host sends when a notification from us failed.
pub const ERROR_EVENT: &str = "nvim_error_event";

/// Counters describing a finished dispatch loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Evaluations run and replied to.
    pub evaluations: u64,
    /// Evaluations whose outcome was a failure.
    pub failed_evaluations: u64,
    /// Notifications dropped as unsupported or malformed.
    pub dropped_notifications: u64,
    /// Host requests answered with an error.
    pub declined_requests: u64,
}

/// The dispatch loop.
///
/// Owns every piece of state the loop touches, so evaluations are
/// serialised by construction.
#[derive(Debug)]
pub struct Dispatcher<C> {
    channel: C,
    environment: Environment,
    emitter: ReplyEmitter,
    summary: DispatchSummary,
}

impl<C> Dispatcher<C>
where
    C: HostChannel,
{
    /// Assembles a loop over `channel` evaluating against `environment`.
    #[must_use]
    pub fn new(channel: C, environment: Environment, emitter: ReplyEmitter) -> Self {
        Self {
            channel,
            environment,
            emitter,
            summary: DispatchSummary::default(),
        }
    }

    /// Processes messages until the host closes the connection.
    ///
    /// A decoded value that is not a msgpack-RPC envelope is dropped; the
    /// stream stays aligned because msgpack values are self-delimiting.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Transport`] when reading from the host fails
    /// and [`DispatchError::ReplyDelivery`] when a reply cannot be written.
    pub fn run(mut self) -> Result<DispatchSummary, DispatchError> {
        loop {
            let handled = match self.channel.next_message() {
                Ok(Some(message)) => self.handle(message),
                Ok(None) => break,
                Err(RpcError::Codec(CodecError::Message(error))) => {
                    Err(DispatchError::InvalidEnvelope(error))
                }
                Err(error) => return Err(error.into()),
            };
            match handled {
                Ok(()) => {}
                Err(error) if error.is_per_message() => {
                    warn!(target: DISPATCH_TARGET, error = %error, "dropping message");
                    self.summary.dropped_notifications += 1;
                }
                Err(error) => return Err(error),
            }
        }
        info!(
            target: DISPATCH_TARGET,
            evaluations = self.summary.evaluations,
            failed = self.summary.failed_evaluations,
            dropped = self.summary.dropped_notifications,
            declined = self.summary.declined_requests,
            "host closed the connection"
        );
        Ok(self.summary)
    }

    fn handle(&mut self, message: Message) -> Result<(), DispatchError> {
        match message {
            Message::Notification(notification) => self.handle_notification(notification),
            Message::Request(request) => self.decline(request),
            Message::Response(response) => {
                ignore_response(&response);
                Ok(())
            }
        }
    }

    fn handle_notification(&mut self, notification: Notification) -> Result<(), DispatchError> {
        let Notification { method, params } = notification;
        match method.as_str() {
            EVAL_FETCH => self.evaluate(params),
            ERROR_EVENT => {
                report_host_error(&params);
                Ok(())
            }
            _ => Err(DispatchError::UnsupportedNotification { method }),
        }
    }

    fn evaluate(&mut self, params: Vec<Value>) -> Result<(), DispatchError> {
        let request = match EvalRequest::from_params(params) {
            Ok(request) => request,
            Err(error) => return self.reject(error),
        };
        debug!(
            target: DISPATCH_TARGET,
            serial = %request.serial,
            bytes = request.source.len(),
            "evaluating snippet"
        );
        let outcome = eval::evaluate(&self.environment, &request.source);
        self.summary.evaluations += 1;
        if !outcome.is_success() {
            self.summary.failed_evaluations += 1;
        }
        self.emitter
            .emit(&mut self.channel, request.serial, &outcome)?;
        Ok(())
    }

    /// Answers a malformed request when its serial survived parsing.
    fn reject(&mut self, error: RequestError) -> Result<(), DispatchError> {
        if let Some(serial) = error.serial().cloned() {
            let outcome = EvalOutcome::failed(format!("malformed eval request: {error}"));
            self.emitter.emit(&mut self.channel, serial, &outcome)?;
        }
        Err(DispatchError::MalformedRequest(error))
    }

    fn decline(&mut self, request: Request) -> Result<(), DispatchError> {
        warn!(
            target: DISPATCH_TARGET,
            method = %request.method,
            id = request.id,
            "declining unsupported host request"
        );
        let message = format!("request '{}' is not supported", request.method);
        self.channel.respond(request.id, Err(Value::from(message)))?;
        self.summary.declined_requests += 1;
        Ok(())
    }
}

fn ignore_response(response: &Response) {
    debug!(
        target: DISPATCH_TARGET,
        id = response.id,
        "ignoring response with no pending request"
    );
}

/// Logs an `nvim_error_event`, whose parameters are `[type, message]`.
fn report_host_error(params: &[Value]) {
    let kind = params.first().and_then(Value::as_i64);
    let message = params
        .get(1)
        .and_then(Value::as_str)
        .map_or_else(|| Value::Array(params.to_vec()).to_string(), str::to_owned);
    error!(
        target: DISPATCH_TARGET,
        error_type = ?kind,
        message = %message,
        "host reported an error for a notification"
    );
}
