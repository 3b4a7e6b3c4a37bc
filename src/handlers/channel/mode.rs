//! MODE command handler: room ban and mute lists.

use std::sync::Arc;

use async_trait::async_trait;
use minirc_proto::{Command, Message, ModeFlag, Response};
use tracing::info;

use super::super::helpers::err_notonchannel;
use super::super::{Context, Handler};
use crate::error::HandlerResult;

/// Handler for the MODE command (`+b`/`-b`/`+m`/`-m` with a nickname target).
pub struct ModeHandler;

#[async_trait]
impl Handler for ModeHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::MODE(name, change, target) = &msg.command else {
            return Ok(());
        };
        let nick = ctx.nick_or_star();

        let Some(room) = ctx.registry.get_room(name) else {
            return ctx
                .send(err_notonchannel(ctx.server_name(), &nick, name))
                .await;
        };

        // Apply the flag and snapshot the member set before any removal so
        // a banned member still hears the 324 and its own force-part.
        let member_ids = {
            let mut guard = room.write();
            match (change.flag, change.grant) {
                (ModeFlag::Ban, true) => guard.ban(target),
                (ModeFlag::Ban, false) => guard.unban(target),
                (ModeFlag::Mute, true) => guard.mute(target),
                (ModeFlag::Mute, false) => guard.unmute(target),
            };
            guard.member_ids()
        };

        let mode_line = Arc::new(Message::reply(
            ctx.server_name(),
            Response::RPL_CHANNELMODEIS,
            vec![
                nick.clone(),
                name.clone(),
                change.to_string(),
                target.clone(),
            ],
            None,
        ));
        ctx.registry.broadcast(&member_ids, mode_line, None).await;

        info!(nick = %nick, room = %name, change = %change, target = %target, "mode applied");

        // A fresh ban forces any member holding that nickname out.
        if change.grant && change.flag == ModeFlag::Ban {
            if let Some(target_id) = ctx.registry.find_by_nick(target) {
                let was_member = { room.write().part(target_id) };
                if was_member {
                    let part_line =
                        Arc::new(Message::from_nick(target, Command::PART(name.clone())));
                    ctx.registry.broadcast(&member_ids, part_line, None).await;
                    ctx.registry.remove_room_if_empty(name);
                    info!(target = %target, room = %name, "banned member force-parted");
                }
            }
        }

        Ok(())
    }
}
