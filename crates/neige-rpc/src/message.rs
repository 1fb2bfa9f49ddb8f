//! Msgpack-RPC message types.

use rmpv::Value;

use crate::errors::MessageError;

/// Identifier correlating a request with its response.
pub type MessageId = u32;

const REQUEST_KIND: u64 = 0;
const RESPONSE_KIND: u64 = 1;
const NOTIFICATION_KIND: u64 = 2;

/// A msgpack-RPC request (a response is expected).
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Request identifier echoed in the response.
    pub id: MessageId,
    /// The method to invoke.
    pub method: String,
    /// Positional parameters.
    pub params: Vec<Value>,
}

/// A msgpack-RPC response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Identifier of the request being answered.
    pub id: MessageId,
    /// Error value, `nil` on success.
    pub error: Value,
    /// Result value, `nil` on failure.
    pub result: Value,
}

/// A msgpack-RPC notification (no response expected).
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// The method (or event type tag).
    pub method: String,
    /// Positional parameters.
    pub params: Vec<Value>,
}

/// Any message that travels over the connection.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Peer expects a response.
    Request(Request),
    /// Answer to an earlier request.
    Response(Response),
    /// Fire-and-forget message.
    Notification(Notification),
}

impl Request {
    /// Creates a request.
    #[must_use]
    pub fn new(id: MessageId, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }
}

impl Response {
    /// Creates a successful response.
    #[must_use]
    pub fn success(id: MessageId, result: Value) -> Self {
        Self {
            id,
            error: Value::Nil,
            result,
        }
    }

    /// Creates an error response.
    #[must_use]
    pub fn failure(id: MessageId, error: Value) -> Self {
        Self {
            id,
            error,
            result: Value::Nil,
        }
    }

    /// Splits the response into its result or error value.
    ///
    /// # Errors
    ///
    /// Returns the error value when it is not `nil`.
    pub fn into_result(self) -> Result<Value, Value> {
        if self.error.is_nil() {
            Ok(self.result)
        } else {
            Err(self.error)
        }
    }
}

impl Notification {
    /// Creates a notification.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

impl Message {
    /// Returns the wire name of the message kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Response(_) => "response",
            Self::Notification(_) => "notification",
        }
    }

    /// Converts the message into its msgpack-RPC envelope.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Request(request) => Value::Array(vec![
                Value::from(REQUEST_KIND),
                Value::from(request.id),
                Value::from(request.method),
                Value::Array(request.params),
            ]),
            Self::Response(response) => Value::Array(vec![
                Value::from(RESPONSE_KIND),
                Value::from(response.id),
                response.error,
                response.result,
            ]),
            Self::Notification(notification) => Value::Array(vec![
                Value::from(NOTIFICATION_KIND),
                Value::from(notification.method),
                Value::Array(notification.params),
            ]),
        }
    }

    /// Interprets a decoded value as a msgpack-RPC envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`MessageError`] describing the first structural problem.
    pub fn from_value(value: Value) -> Result<Self, MessageError> {
        let Value::Array(elements) = value else {
            return Err(MessageError::NotArray);
        };
        let kind = elements.first().ok_or(MessageError::Empty)?;
        match kind.as_u64() {
            Some(REQUEST_KIND) => parse_request(elements),
            Some(RESPONSE_KIND) => parse_response(elements),
            Some(NOTIFICATION_KIND) => parse_notification(elements),
            _ => Err(MessageError::UnknownKind {
                kind: kind.to_string(),
            }),
        }
    }
}

impl From<Request> for Message {
    fn from(request: Request) -> Self {
        Self::Request(request)
    }
}

impl From<Response> for Message {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<Notification> for Message {
    fn from(notification: Notification) -> Self {
        Self::Notification(notification)
    }
}

fn expect_arity(
    kind: &'static str,
    elements: &[Value],
    expected: usize,
) -> Result<(), MessageError> {
    if elements.len() == expected {
        Ok(())
    } else {
        Err(MessageError::Arity {
            kind,
            expected,
            found: elements.len(),
        })
    }
}

fn message_id(kind: &'static str, value: &Value) -> Result<MessageId, MessageError> {
    value
        .as_u64()
        .and_then(|id| MessageId::try_from(id).ok())
        .ok_or(MessageError::InvalidField {
            kind,
            field: "msgid",
            expected: "a 32-bit unsigned integer",
        })
}

fn method_name(kind: &'static str, value: Value) -> Result<String, MessageError> {
    let invalid = MessageError::InvalidField {
        kind,
        field: "method",
        expected: "a UTF-8 string",
    };
    match value {
        Value::String(text) => text.into_str().ok_or(invalid),
        Value::Binary(bytes) => String::from_utf8(bytes).map_err(|_| invalid),
        _ => Err(invalid),
    }
}

fn params(kind: &'static str, value: Value) -> Result<Vec<Value>, MessageError> {
    match value {
        Value::Array(params) => Ok(params),
        _ => Err(MessageError::InvalidField {
            kind,
            field: "params",
            expected: "an array",
        }),
    }
}

fn parse_request(elements: Vec<Value>) -> Result<Message, MessageError> {
    const KIND: &str = "request";
    expect_arity(KIND, &elements, 4)?;
    let mut fields = elements.into_iter().skip(1);
    let (Some(id), Some(method), Some(args)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(MessageError::Arity {
            kind: KIND,
            expected: 4,
            found: 0,
        });
    };
    Ok(Message::Request(Request {
        id: message_id(KIND, &id)?,
        method: method_name(KIND, method)?,
        params: params(KIND, args)?,
    }))
}

fn parse_response(elements: Vec<Value>) -> Result<Message, MessageError> {
    const KIND: &str = "response";
    expect_arity(KIND, &elements, 4)?;
    let mut fields = elements.into_iter().skip(1);
    let (Some(id), Some(error), Some(result)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(MessageError::Arity {
            kind: KIND,
            expected: 4,
            found: 0,
        });
    };
    Ok(Message::Response(Response {
        id: message_id(KIND, &id)?,
        error,
        result,
    }))
}

fn parse_notification(elements: Vec<Value>) -> Result<Message, MessageError> {
    const KIND: &str = "notification";
    expect_arity(KIND, &elements, 3)?;
    let mut fields = elements.into_iter().skip(1);
    let (Some(method), Some(args)) = (fields.next(), fields.next()) else {
        return Err(MessageError::Arity {
            kind: KIND,
            expected: 3,
            found: 0,
        });
    };
    Ok(Message::Notification(Notification {
        method: method_name(KIND, method)?,
        params: params(KIND, args)?,
    }))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn envelope(elements: Vec<Value>) -> Value {
        Value::Array(elements)
    }

    #[rstest]
    fn parses_host_notification() {
        let value = envelope(vec![
            Value::from(2),
            Value::from("eval_fetch"),
            Value::Array(vec![Value::Array(vec![
                Value::from(42),
                Value::Array(vec![Value::from("1 + 1")]),
            ])]),
        ]);

        let message = Message::from_value(value).expect("notification should parse");

        let Message::Notification(notification) = message else {
            panic!("expected notification");
        };
        assert_eq!(notification.method, "eval_fetch");
        assert_eq!(notification.params.len(), 1);
    }

    #[rstest]
    fn parses_error_response() {
        let value = envelope(vec![
            Value::from(1),
            Value::from(7),
            Value::Array(vec![Value::from(0), Value::from("boom")]),
            Value::Nil,
        ]);

        let Message::Response(response) = Message::from_value(value).expect("parse") else {
            panic!("expected response");
        };
        assert_eq!(response.id, 7);
        assert!(response.into_result().is_err());
    }

    #[rstest]
    fn encodes_request_envelope() {
        let request = Request::new(3, "nvim_exec_lua", vec![Value::from("return 1")]);

        let value = Message::from(request).into_value();

        assert_eq!(
            value,
            envelope(vec![
                Value::from(0),
                Value::from(3),
                Value::from("nvim_exec_lua"),
                Value::Array(vec![Value::from("return 1")]),
            ])
        );
    }

    #[rstest]
    #[case(Value::from("nope"), MessageError::NotArray)]
    #[case(envelope(Vec::new()), MessageError::Empty)]
    #[case(
        envelope(vec![Value::from(2), Value::from("x")]),
        MessageError::Arity { kind: "notification", expected: 3, found: 2 }
    )]
    #[case(
        envelope(vec![
            Value::from(0),
            Value::from(-1),
            Value::from("m"),
            Value::Array(Vec::new()),
        ]),
        MessageError::InvalidField {
            kind: "request",
            field: "msgid",
            expected: "a 32-bit unsigned integer",
        }
    )]
    #[case(
        envelope(vec![Value::from(2), Value::from("m"), Value::Nil]),
        MessageError::InvalidField { kind: "notification", field: "params", expected: "an array" }
    )]
    fn rejects_malformed_envelopes(#[case] value: Value, #[case] expected: MessageError) {
        assert_eq!(Message::from_value(value), Err(expected));
    }

    #[rstest]
    fn rejects_unknown_kind() {
        let value = envelope(vec![Value::from(9), Value::Nil, Value::Nil]);
        assert!(matches!(
            Message::from_value(value),
            Err(MessageError::UnknownKind { .. })
        ));
    }
}
