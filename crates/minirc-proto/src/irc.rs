//! Message codec for tokio.
//!
//! Wraps [`LineCodec`] and parses each non-empty line into a [`Message`].
//! Outbound messages are serialized and CRLF-terminated.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};
use crate::line::LineCodec;
use crate::message::Message;

/// Tokio codec for encoding/decoding protocol messages.
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self {
            inner: LineCodec::new(),
        }
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        // Empty lines between messages are silently dropped; keep pulling
        // lines so a buffered batch is fully drained.
        while let Some(line) = self.inner.decode(src)? {
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.trim().is_empty() {
                continue;
            }

            return trimmed
                .parse::<Message>()
                .map(Some)
                .map_err(|cause| ProtocolError::InvalidMessage {
                    string: trimmed.to_string(),
                    cause,
                });
        }

        Ok(None)
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        <Self as Encoder<&Message>>::encode(self, &msg, dst)
    }
}

impl Encoder<&Message> for IrcCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: &Message, dst: &mut BytesMut) -> error::Result<()> {
        let mut line = msg.to_string();
        line.push_str("\r\n");
        self.inner.encode(line, dst)
    }
}
