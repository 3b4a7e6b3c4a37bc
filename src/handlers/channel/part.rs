//! PART command handler.

use std::sync::Arc;

use async_trait::async_trait;
use minirc_proto::{Command, Message};
use tracing::info;

use super::super::helpers::err_notonchannel;
use super::super::{Context, Handler};
use crate::error::HandlerResult;

/// Handler for the PART command.
pub struct PartHandler;

#[async_trait]
impl Handler for PartHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::PART(name) = &msg.command else {
            return Ok(());
        };
        let nick = ctx.nick_or_star();

        let Some(room) = ctx.registry.get_room(name) else {
            return ctx
                .send(err_notonchannel(ctx.server_name(), &nick, name))
                .await;
        };

        // The PART goes to every current member, the leaver included, so the
        // snapshot is taken before removal.
        let outcome = {
            let mut guard = room.write();
            if !guard.is_member(ctx.id) {
                None
            } else {
                let ids = guard.member_ids();
                guard.part(ctx.id);
                Some(ids)
            }
        };
        let Some(member_ids) = outcome else {
            return ctx
                .send(err_notonchannel(ctx.server_name(), &nick, name))
                .await;
        };

        let part_line = Arc::new(Message::from_nick(&nick, Command::PART(name.clone())));
        ctx.registry.broadcast(&member_ids, part_line, None).await;

        ctx.registry.remove_room_if_empty(name);

        info!(nick = %nick, room = %name, "left room");
        Ok(())
    }
}
