//! Command handler context.

use std::sync::Arc;

use minirc_proto::{Message, Response};
use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::error::{HandlerError, HandlerResult};
use crate::state::{Registry, Session, SessionId};

/// Context passed to each command handler: the originating session, the
/// shared registry, and the session's own writer queue for direct replies.
pub struct Context<'a> {
    pub id: SessionId,
    pub registry: &'a Arc<Registry>,
    pub sender: &'a mpsc::Sender<Arc<Message>>,
}

impl Context<'_> {
    pub fn server_name(&self) -> &str {
        &self.registry.server_name
    }

    pub fn session(&self) -> Option<Arc<RwLock<Session>>> {
        self.registry.session(self.id)
    }

    /// The session's nickname, or `*` before NICK.
    pub fn nick_or_star(&self) -> String {
        self.session()
            .map(|session| session.read().nick_or_star().to_string())
            .unwrap_or_else(|| "*".to_string())
    }

    /// Queue one line for this session.
    pub async fn send(&self, msg: Message) -> Result<(), HandlerError> {
        self.sender.send(Arc::new(msg)).await?;
        Ok(())
    }

    /// Build and queue a numeric reply in one call.
    pub async fn send_reply(
        &self,
        code: Response,
        params: Vec<String>,
        trailing: Option<String>,
    ) -> HandlerResult {
        self.send(Message::reply(self.server_name(), code, params, trailing))
            .await
    }
}
