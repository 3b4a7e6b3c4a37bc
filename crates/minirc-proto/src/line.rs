//! Line-based codec for tokio.
//!
//! Reads newline-terminated lines (CR before LF tolerated) and writes raw
//! strings. Lines are limited to 512 bytes, the protocol's framing floor.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Default maximum framed line length in bytes, terminator included.
pub const MAX_LINE_LEN: usize = 512;

/// Newline-delimited line codec.
pub struct LineCodec {
    /// Index of the next byte to check for a newline.
    next_index: usize,
    /// Maximum line length.
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with the default 512-byte limit.
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: MAX_LINE_LEN,
        }
    }

    /// Create a codec with a custom line length limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(error::ProtocolError::MessageTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            let data = std::str::from_utf8(&line)
                .map_err(|e| error::ProtocolError::InvalidUtf8 {
                    byte_pos: e.valid_up_to(),
                    details: e.to_string(),
                })?
                .to_string();

            Ok(Some(data))
        } else {
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(error::ProtocolError::MessageTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend(msg.into_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("NICK alice\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("NICK alice\r\n".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn tolerates_bare_lf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("NICK alice\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("NICK alice\n".to_string()));
    }

    #[test]
    fn waits_for_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("NICK al");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"ice\r\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("NICK alice\r\n".to_string())
        );
    }

    #[test]
    fn rejects_oversized_line() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this line is far too long\n");

        assert!(matches!(
            codec.decode(&mut buf),
            Err(error::ProtocolError::MessageTooLong { .. })
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"NICK \xff\xfe\n"[..]);

        assert!(matches!(
            codec.decode(&mut buf),
            Err(error::ProtocolError::InvalidUtf8 { .. })
        ));
    }
}
