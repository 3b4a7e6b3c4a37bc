//! USER command handler.

use async_trait::async_trait;
use minirc_proto::{Command, Message, Response};
use tracing::{debug, info};

use super::super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};

/// Handler for the USER command: completes registration and sends the
/// welcome triplet.
pub struct UserHandler;

#[async_trait]
impl Handler for UserHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::USER(user, _mode, _realname) = &msg.command else {
            return Ok(());
        };

        let Some(session) = ctx.session() else {
            return Ok(());
        };

        let nick = {
            let mut guard = session.write();
            if guard.registered {
                debug!(id = %ctx.id, "USER on a registered session ignored");
                return Ok(());
            }
            let Some(nick) = guard.nick.clone() else {
                return Err(HandlerError::NoNicknameGiven);
            };
            guard.user = Some(user.clone());
            if guard.can_register() {
                guard.registered = true;
            }
            nick
        };

        let server_name = ctx.server_name().to_string();
        ctx.send(Message::reply(
            &server_name,
            Response::RPL_WELCOME,
            vec![nick.clone()],
            Some("Welcome to the IRC server!".to_string()),
        ))
        .await?;
        ctx.send(Message::reply(
            &server_name,
            Response::RPL_YOURHOST,
            vec![nick.clone()],
            Some(format!("Your host is {}", server_name)),
        ))
        .await?;
        ctx.send(Message::reply(
            &server_name,
            Response::RPL_MYINFO,
            vec![nick.clone(), server_name.clone()],
            None,
        ))
        .await?;

        info!(id = %ctx.id, nick = %nick, "session registered");
        Ok(())
    }
}
