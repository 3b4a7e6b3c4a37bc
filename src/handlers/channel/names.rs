//! NAMES command handler.

use async_trait::async_trait;
use minirc_proto::{Command, Message};

use super::super::helpers::{err_notonchannel, names_replies};
use super::super::{Context, Handler};
use crate::error::HandlerResult;

/// Handler for the NAMES command.
pub struct NamesHandler;

#[async_trait]
impl Handler for NamesHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::NAMES(name) = &msg.command else {
            return Ok(());
        };
        let nick = ctx.nick_or_star();

        let Some(room) = ctx.registry.get_room(name) else {
            return ctx
                .send(err_notonchannel(ctx.server_name(), &nick, name))
                .await;
        };

        let member_ids = room.read().member_ids();
        let names = ctx.registry.nicknames(&member_ids);
        let (namreply, endofnames) = names_replies(ctx.server_name(), &nick, name, &names);
        ctx.send(namreply).await?;
        ctx.send(endofnames).await
    }
}
