//! TOPIC command handler.

use std::sync::Arc;

use async_trait::async_trait;
use minirc_proto::{Command, Message, Response};
use tracing::info;

use super::super::helpers::err_notonchannel;
use super::super::{Context, Handler};
use crate::error::HandlerResult;

/// Handler for the TOPIC command: set-and-broadcast with an argument, 332/331
/// query without.
pub struct TopicHandler;

#[async_trait]
impl Handler for TopicHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::TOPIC(name, topic) = &msg.command else {
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

        match topic {
            Some(text) => {
                let member_ids = {
                    let mut guard = room.write();
                    guard.topic = Some(text.clone());
                    guard.member_ids()
                };
                let line = Arc::new(Message::from_nick(
                    &nick,
                    Command::TOPIC(name.clone(), Some(text.clone())),
                ));
                ctx.registry.broadcast(&member_ids, line, None).await;
                info!(nick = %nick, room = %name, "topic changed");
                Ok(())
            }
            None => {
                let current = { room.read().topic.clone() };
                match current {
                    Some(text) => {
                        ctx.send_reply(Response::RPL_TOPIC, vec![nick, name.clone()], Some(text))
                            .await
                    }
                    None => {
                        ctx.send_reply(
                            Response::RPL_NOTOPIC,
                            vec![nick, name.clone()],
                            Some("No topic is set".to_string()),
                        )
                        .await
                    }
                }
            }
        }
    }
}
