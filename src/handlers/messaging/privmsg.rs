//! PRIVMSG command handler.

use std::sync::Arc;

use async_trait::async_trait;
use minirc_proto::{ChannelExt, Command, Message};
use tracing::debug;

use super::super::helpers::{err_cannotsendtochan, err_nosuchchannel, err_nosuchnick, err_notonchannel};
use super::super::{Context, Handler};
use crate::error::HandlerResult;

/// Handler for the PRIVMSG command: room fan-out (sender excluded) or
/// nickname unicast.
pub struct PrivmsgHandler;

#[async_trait]
impl Handler for PrivmsgHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::PRIVMSG(target, text) = &msg.command else {
            return Ok(());
        };
        let nick = ctx.nick_or_star();

        if target.is_channel_name() {
            let Some(room) = ctx.registry.get_room(target) else {
                return ctx
                    .send(err_nosuchchannel(ctx.server_name(), &nick, target))
                    .await;
            };

            let (is_member, silenced, member_ids) = {
                let guard = room.read();
                (
                    guard.is_member(ctx.id),
                    guard.is_banned(&nick) || guard.is_muted(&nick),
                    guard.member_ids(),
                )
            };

            if !is_member {
                return ctx
                    .send(err_notonchannel(ctx.server_name(), &nick, target))
                    .await;
            }
            if silenced {
                return ctx
                    .send(err_cannotsendtochan(ctx.server_name(), &nick, target))
                    .await;
            }

            let line = Arc::new(Message::from_nick(
                &nick,
                Command::PRIVMSG(target.clone(), text.clone()),
            ));
            ctx.registry.broadcast(&member_ids, line, Some(ctx.id)).await;
            debug!(nick = %nick, room = %target, "room message relayed");
        } else {
            let Some(peer) = ctx.registry.find_by_nick(target) else {
                return ctx
                    .send(err_nosuchnick(ctx.server_name(), &nick, target))
                    .await;
            };

            let line = Arc::new(Message::from_nick(
                &nick,
                Command::PRIVMSG(target.clone(), text.clone()),
            ));
            ctx.registry.send_to(peer, line).await;
            debug!(nick = %nick, target = %target, "private message relayed");
        }

        Ok(())
    }
}
