//! Command dispatch: the verb table and the per-session state gate.

use std::collections::HashMap;

use async_trait::async_trait;
use minirc_proto::Message;
use tracing::debug;

use super::channel::{JoinHandler, KickHandler, ModeHandler, NamesHandler, PartHandler, TopicHandler};
use super::connection::{BotAuthHandler, NickHandler, QuitHandler, UserHandler};
use super::context::Context;
use super::helpers::err_unknowncommand;
use super::messaging::PrivmsgHandler;
use crate::error::{HandlerError, HandlerResult};

/// A command handler.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult;
}

/// Routes one parsed message to its handler, enforcing the session state
/// machine: NICK, QUIT, and BOT_AUTH in any state, USER until registered,
/// everything else only after registration.
pub struct Dispatcher {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // Connection/registration handlers
        handlers.insert("NICK", Box::new(NickHandler));
        handlers.insert("USER", Box::new(UserHandler));
        handlers.insert("QUIT", Box::new(QuitHandler));
        handlers.insert("BOT_AUTH", Box::new(BotAuthHandler));

        // Room handlers
        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("PART", Box::new(PartHandler));
        handlers.insert("TOPIC", Box::new(TopicHandler));
        handlers.insert("NAMES", Box::new(NamesHandler));
        handlers.insert("KICK", Box::new(KickHandler));
        handlers.insert("MODE", Box::new(ModeHandler));

        // Messaging handlers
        handlers.insert("PRIVMSG", Box::new(PrivmsgHandler));

        Self { handlers }
    }

    /// Dispatch one message.
    ///
    /// Validation failures are answered with a numeric and `Ok(())`; an `Err`
    /// return means the connection must terminate (QUIT, or the session's
    /// writer is gone).
    pub async fn dispatch(&self, ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
        let verb = msg.command.name().to_string();
        let nick = ctx.nick_or_star();

        let handler = match self.handlers.get(verb.as_str()) {
            Some(handler) => handler,
            None => {
                debug!(verb = %verb, "unknown command");
                return ctx
                    .send(err_unknowncommand(ctx.server_name(), &nick, &verb))
                    .await;
            }
        };

        // Registration gate: NICK is always allowed, USER is gated inside its
        // handler (431 without a nick), QUIT and BOT_AUTH work in any state
        // (one tears the session down, the other is out-of-band auth), and
        // everything else needs registration.
        if !matches!(verb.as_str(), "NICK" | "USER" | "QUIT" | "BOT_AUTH") {
            let registered = ctx
                .session()
                .map(|session| session.read().registered)
                .unwrap_or(false);
            if !registered {
                if let Some(reply) =
                    HandlerError::NotRegistered.to_irc_reply(ctx.server_name(), &nick)
                {
                    ctx.send(reply).await?;
                }
                return Ok(());
            }
        }

        match handler.handle(ctx, msg).await {
            Ok(()) => Ok(()),
            Err(err @ (HandlerError::Quit(_) | HandlerError::Send(_))) => Err(err),
            Err(err) => {
                if let Some(reply) = err.to_irc_reply(ctx.server_name(), &nick) {
                    ctx.send(reply).await?;
                }
                Ok(())
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
