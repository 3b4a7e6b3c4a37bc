//! QUIT command handler.

use async_trait::async_trait;
use minirc_proto::{Command, Message};

use super::super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};

/// Handler for the QUIT command. The connection loop runs the disconnect
/// path; peers sharing a room hear `:<nick> QUIT :Client Quit` from it.
pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, _ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let reason = match &msg.command {
            Command::QUIT(reason) => reason.clone(),
            _ => None,
        };
        Err(HandlerError::Quit(reason))
    }
}
