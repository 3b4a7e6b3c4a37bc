//! NICK command handler.

use std::sync::Arc;

use async_trait::async_trait;
use minirc_proto::{Command, Message};
use tracing::info;

use super::super::{Context, Handler};
use crate::error::HandlerResult;

/// Handler for the NICK command.
///
/// Collisions are never fatal: the registry resolves them by suffixing a
/// random four-digit number and the client is told about the rename with a
/// NOTICE.
pub struct NickHandler;

#[async_trait]
impl Handler for NickHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let Command::NICK(wanted) = &msg.command else {
            return Ok(());
        };

        let (old_nick, registered) = match ctx.session() {
            Some(session) => {
                let guard = session.read();
                (guard.nick.clone(), guard.registered)
            }
            None => return Ok(()),
        };

        let assigned = ctx.registry.assign_nick(ctx.id, wanted);

        if assigned.renamed {
            let text = format!(
                "Nickname {} is already in use, you are now known as {}",
                wanted, assigned.nick
            );
            ctx.send(Message::notice(ctx.server_name(), &assigned.nick, &text))
                .await?;
        }

        // A registered session changing nick announces it to itself and to
        // every peer sharing a room.
        if registered {
            if let Some(old) = old_nick {
                if old != assigned.nick {
                    let change =
                        Message::from_nick(&old, Command::NICK(assigned.nick.clone()));
                    ctx.send(change.clone()).await?;

                    let peers = ctx.registry.peers_sharing_rooms(ctx.id);
                    ctx.registry.broadcast(&peers, Arc::new(change), None).await;
                }
            }
        }

        info!(id = %ctx.id, nick = %assigned.nick, renamed = assigned.renamed, "nick assigned");
        Ok(())
    }
}
