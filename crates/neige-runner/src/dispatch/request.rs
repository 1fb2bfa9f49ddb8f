//! Parsing of `eval_fetch` payloads.

use neige_rpc::Value;
use thiserror::Error;

/// Separator placed between code lines.
const LINE_SEPARATOR: &str = "\n";

/// One evaluation the host asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalRequest {
    /// Opaque correlation token echoed back in the reply.
    pub serial: Value,
    /// The snippet, reassembled from its lines.
    pub source: String,
}

/// Ways an `eval_fetch` payload can be malformed.
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    /// The payload is not `[[serial, code_lines]]`.
    #[error("expected [[serial, code_lines]], got {payload}")]
    Shape {
        /// Rendering of the received parameters.
        payload: String,
    },
    /// `code_lines` is not an array.
    #[error("code lines must be an array of strings, got {found}")]
    CodeLines {
        /// Serial recovered from the payload.
        serial: Value,
        /// Rendering of the received value.
        found: String,
    },
    /// One entry of `code_lines` is not a string.
    #[error("code line {index} is not a string: {found}")]
    CodeLine {
        /// Serial recovered from the payload.
        serial: Value,
        /// Zero-based position of the offending line.
        index: usize,
        /// Rendering of the received value.
        found: String,
    },
}

impl RequestError {
    /// Serial of the request, when the payload got far enough to carry one.
    #[must_use]
    pub fn serial(&self) -> Option<&Value> {
        match self {
            Self::Shape { .. } => None,
            Self::CodeLines { serial, .. } | Self::CodeLine { serial, .. } => Some(serial),
        }
    }
}

impl EvalRequest {
    /// Extracts the request from notification parameters.
    ///
    /// Lines are joined with `\n` exactly as received: no trimming, and an
    /// empty line list yields an empty snippet.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when the payload does not have the expected
    /// shape.
    pub fn from_params(params: Vec<Value>) -> Result<Self, RequestError> {
        let shape_error = |params: &[Value]| RequestError::Shape {
            payload: Value::Array(params.to_vec()).to_string(),
        };
        let [payload] = params.as_slice() else {
            return Err(shape_error(params.as_slice()));
        };
        let Some([serial, lines]) = payload.as_array().map(Vec::as_slice) else {
            return Err(shape_error(params.as_slice()));
        };
        let serial = serial.clone();
        let Some(lines) = lines.as_array() else {
            return Err(RequestError::CodeLines {
                serial,
                found: lines.to_string(),
            });
        };
        let lines = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                line_text(line).ok_or_else(|| RequestError::CodeLine {
                    serial: serial.clone(),
                    index,
                    found: line.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            source: lines.join(LINE_SEPARATOR),
            serial,
        })
    }
}

/// Accepts msgpack strings and the binary strings some hosts send for
/// buffer text.
fn line_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => text.as_str().map(str::to_owned),
        Value::Binary(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}
