//! Msgpack framing over byte streams.
//!
//! Msgpack values are self-delimiting, so unlike LSP's `Content-Length`
//! framing each message is simply one encoded array on the stream.

use std::io::{self, Read, Write};

use crate::errors::CodecError;
use crate::message::Message;

/// Decodes msgpack-RPC messages from a byte stream.
#[derive(Debug)]
pub struct MessageReader<R> {
    inner: R,
}

impl<R: Read> MessageReader<R> {
    /// Wraps a reader. Callers should supply a buffered reader.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads the next message, blocking until one is available.
    ///
    /// Returns `Ok(None)` when the peer closed the stream at a message
    /// boundary.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] when the stream ends mid-message or
    /// contains invalid msgpack, and [`CodecError::Message`] when the value is
    /// not a msgpack-RPC envelope.
    pub fn read_message(&mut self) -> Result<Option<Message>, CodecError> {
        let value = match rmpv::decode::read_value(&mut self.inner) {
            Ok(value) => value,
            Err(rmpv::decode::Error::InvalidMarkerRead(error))
                if error.kind() == io::ErrorKind::UnexpectedEof =>
            {
                return Ok(None);
            }
            Err(error) => return Err(CodecError::Decode(error)),
        };
        Message::from_value(value).map(Some).map_err(CodecError::from)
    }
}

/// Encodes msgpack-RPC messages onto a byte stream.
#[derive(Debug)]
pub struct MessageWriter<W> {
    inner: W,
}

impl<W: Write> MessageWriter<W> {
    /// Wraps a writer.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Writes one message and flushes it to the peer.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when encoding or writing fails.
    pub fn write_message(&mut self, message: Message) -> Result<(), CodecError> {
        let mut buffer = Vec::new();
        rmpv::encode::write_value(&mut buffer, &message.into_value())?;
        self.inner.write_all(&buffer)?;
        self.inner.flush()?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.inner
    }
}
