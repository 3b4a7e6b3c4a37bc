//! JOIN command handler.

use std::sync::Arc;

use async_trait::async_trait;
use minirc_proto::{ChannelExt, Command, Message};
use tracing::info;

use super::super::helpers::{err_bannedfromchan, err_nosuchchannel, names_replies};
use super::super::{Context, Handler};
use crate::error::HandlerResult;

/// Handler for the JOIN command.
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::JOIN(name) = &msg.command else {
            return Ok(());
        };
        let nick = ctx.nick_or_star();

        if !name.is_channel_name() {
            return ctx
                .send(err_nosuchchannel(ctx.server_name(), &nick, name))
                .await;
        }

        let room = ctx.registry.create_or_get_room(name);
        enum JoinOutcome {
            Banned,
            AlreadyJoined,
            Joined(Vec<crate::state::SessionId>),
        }
        let outcome = {
            let mut guard = room.write();
            if guard.is_banned(&nick) {
                JoinOutcome::Banned
            } else if !guard.join(ctx.id) {
                JoinOutcome::AlreadyJoined
            } else {
                JoinOutcome::Joined(guard.member_ids())
            }
        };
        let member_ids = match outcome {
            JoinOutcome::Banned => {
                // A newly created room may be sitting empty now; sweep it.
                ctx.registry.remove_room_if_empty(name);
                return ctx
                    .send(err_bannedfromchan(ctx.server_name(), &nick, name))
                    .await;
            }
            // Re-JOIN of a room the session is already in is a no-op.
            JoinOutcome::AlreadyJoined => return Ok(()),
            JoinOutcome::Joined(member_ids) => member_ids,
        };
        // Heal the narrow race with an empty-room sweep between creation and
        // the join above.
        ctx.registry.ensure_room_reachable(name, &room);

        let join_line = Arc::new(Message::from_nick(&nick, Command::JOIN(name.clone())));
        ctx.registry.broadcast(&member_ids, join_line, None).await;

        let names = ctx.registry.nicknames(&member_ids);
        let (namreply, endofnames) = names_replies(ctx.server_name(), &nick, name, &names);
        ctx.send(namreply).await?;
        ctx.send(endofnames).await?;

        info!(nick = %nick, room = %name, "joined room");
        Ok(())
    }
}
