//! minirc-proto - protocol library for the minircd chat daemon.
//!
//! Provides the owned [`Message`] model, the typed [`Command`] vocabulary,
//! the numeric [`Response`] table, and (behind the default `tokio` feature)
//! a CRLF line codec for framed transports.

mod chan;
mod command;
pub mod error;
mod message;
mod mode;
mod prefix;
mod response;

#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod line;

pub use chan::ChannelExt;
pub use command::Command;
pub use error::{MessageParseError, ProtocolError};
pub use message::Message;
pub use mode::{ModeChange, ModeFlag};
pub use prefix::Prefix;
pub use response::Response;

#[cfg(feature = "tokio")]
pub use irc::IrcCodec;
