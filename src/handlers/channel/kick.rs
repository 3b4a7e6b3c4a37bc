//! KICK command handler.

use std::sync::Arc;

use async_trait::async_trait;
use minirc_proto::{Command, Message};
use tracing::info;

use super::super::helpers::{err_noprivileges, err_nosuchnick, err_notonchannel};
use super::super::{Context, Handler};
use crate::error::HandlerResult;

/// Handler for the KICK command.
///
/// Kicking the authenticated bot is allowed but futile: the server re-adds
/// it to the room immediately after the kick broadcast.
pub struct KickHandler;

#[async_trait]
impl Handler for KickHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::KICK(name, target, _reason) = &msg.command else {
            return Ok(());
        };
        let nick = ctx.nick_or_star();

        let Some(room) = ctx.registry.get_room(name) else {
            return ctx
                .send(err_notonchannel(ctx.server_name(), &nick, name))
                .await;
        };

        if !room.read().is_member(ctx.id) {
            return ctx
                .send(err_notonchannel(ctx.server_name(), &nick, name))
                .await;
        }

        let target_id = ctx
            .registry
            .find_by_nick(target)
            .filter(|&id| room.read().is_member(id));
        let Some(target_id) = target_id else {
            return ctx
                .send(err_nosuchnick(ctx.server_name(), &nick, target))
                .await;
        };

        if target_id == ctx.id {
            return ctx
                .send(err_noprivileges(ctx.server_name(), &nick, name))
                .await;
        }

        let member_ids = room.read().member_ids();
        let kick_line = Arc::new(Message::from_nick(
            &nick,
            Command::KICK(
                name.clone(),
                target.clone(),
                Some(format!("Kicked by {}", nick)),
            ),
        ));
        ctx.registry.broadcast(&member_ids, kick_line, None).await;

        {
            room.write().part(target_id);
        }
        info!(nick = %nick, target = %target, room = %name, "kicked from room");

        // The bot refuses to stay kicked.
        if ctx.registry.is_bot(target) {
            {
                room.write().join(target_id);
            }
            let rejoin = Arc::new(Message::from_nick(target, Command::JOIN(name.clone())));
            let member_ids = room.read().member_ids();
            ctx.registry.broadcast(&member_ids, rejoin, None).await;
            info!(target = %target, room = %name, "bot re-added after kick");
        }

        Ok(())
    }
}
