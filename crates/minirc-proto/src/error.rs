//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors arising from reading, writing, or framing protocol data.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// An underlying I/O error.
    #[error("an io error occurred")]
    Io(#[from] std::io::Error),

    /// A framed line exceeded the codec's length limit.
    #[error("message exceeded line length limit ({actual} > {limit})")]
    MessageTooLong {
        /// Observed line length in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// A line was not valid UTF-8.
    #[error("invalid utf-8 at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        byte_pos: usize,
        /// Description from the UTF-8 decoder.
        details: String,
    },

    /// A line decoded cleanly but was not a valid message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The offending line, without its terminator.
        string: String,
        /// What was wrong with it.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors specific to parsing a single message line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageParseError {
    /// The line was empty (or whitespace only).
    #[error("empty message")]
    EmptyMessage,

    /// The command token was malformed (not letters or a 3-digit numeric).
    #[error("invalid command token")]
    InvalidCommand,

    /// A known command was missing required parameters.
    #[error("{command} is missing required parameters")]
    MissingParams {
        /// The (upper-cased) command verb.
        command: String,
    },

    /// A MODE flag string was not one of the accepted forms.
    #[error("invalid mode string: {raw}")]
    InvalidModeString {
        /// The flag token as received.
        raw: String,
    },
}
