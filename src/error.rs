//! Handler error types and their numeric reply mapping.

use std::sync::Arc;

use minirc_proto::{Message, Response};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while handling a command.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("no nickname given")]
    NoNicknameGiven,

    #[error("not registered")]
    NotRegistered,

    /// The session's own writer queue closed mid-command; the connection is
    /// already going away.
    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<Arc<Message>>),

    /// Client issued QUIT; handled specially by the connection loop.
    #[error("client quit: {0:?}")]
    Quit(Option<String>),
}

impl HandlerError {
    /// Convert to a numeric error reply, if this error warrants one.
    pub fn to_irc_reply(&self, server_name: &str, nick: &str) -> Option<Message> {
        match self {
            Self::NoNicknameGiven => Some(Message::reply(
                server_name,
                Response::ERR_NONICKNAMEGIVEN,
                vec![nick.to_string()],
                Some("No nickname given".to_string()),
            )),
            Self::NotRegistered => Some(Message::reply(
                server_name,
                Response::ERR_NOTREGISTERED,
                vec![nick.to_string()],
                Some("You have not registered".to_string()),
            )),
            Self::Send(_) | Self::Quit(_) => None,
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
