//! BOT_AUTH command handler.

use async_trait::async_trait;
use minirc_proto::{Command, Message, Response};
use tracing::{info, warn};

use super::super::{Context, Handler};
use crate::error::HandlerResult;

/// Handler for the out-of-band BOT_AUTH command.
///
/// A session presenting the configured shared secret has its nickname
/// remembered as the bot: exempt from idle reaping and re-added to a room
/// when kicked. At most one bot nickname is kept at a time.
pub struct BotAuthHandler;

#[async_trait]
impl Handler for BotAuthHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::BOTAUTH(secret) = &msg.command else {
            return Ok(());
        };

        let nick = ctx.nick_or_star();

        if ctx.registry.verify_bot_secret(secret) {
            ctx.registry.set_bot_nick(&nick);
            ctx.send_reply(
                Response::RPL_BOTAUTH,
                vec![nick.clone()],
                Some(format!("BOT_AUTH_SUCCESS {}", nick)),
            )
            .await?;
            info!(id = %ctx.id, nick = %nick, "bot authenticated");
        } else {
            ctx.send(Message::notice(ctx.server_name(), &nick, "BOT_AUTH failed"))
                .await?;
            warn!(id = %ctx.id, nick = %nick, "bot authentication failed");
        }

        Ok(())
    }
}
