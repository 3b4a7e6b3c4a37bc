//! Per-connection event loop.
//!
//! Each accepted socket gets one task running a `select!` loop over three
//! sources: decoded inbound messages, the session's outbound queue, and the
//! shutdown broadcast. Every line written to this socket flows through the
//! outbound queue, so per-recipient write order is the queue order.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use minirc_proto::error::{MessageParseError, ProtocolError};
use minirc_proto::{IrcCodec, Message, Response};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use crate::error::HandlerError;
use crate::handlers::{Context, Dispatcher};
use crate::state::{Registry, SessionId};

/// Outbound queue depth per session. Deep enough to absorb a busy room's
/// fan-out burst; a full queue applies backpressure to the sender's handler.
const OUTBOUND_QUEUE: usize = 512;

/// What to do about a decode error.
enum ReadErrorAction {
    /// Answer with a numeric (if any) and keep reading.
    Recoverable(Option<Message>),
    /// Tear the connection down.
    Fatal,
}

pub struct Connection {
    id: SessionId,
    stream: TcpStream,
    addr: SocketAddr,
    registry: Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
}

impl Connection {
    pub fn new(
        id: SessionId,
        stream: TcpStream,
        addr: SocketAddr,
        registry: Arc<Registry>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            id,
            stream,
            addr,
            registry,
            dispatcher,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let Connection {
            id,
            stream,
            addr,
            registry,
            dispatcher,
        } = self;

        let (tx, mut rx) = mpsc::channel::<Arc<Message>>(OUTBOUND_QUEUE);
        let session = registry.add_session(id, addr, tx);
        let mut framed = Framed::new(stream, IrcCodec::new());
        let mut shutdown_rx = registry.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                inbound = framed.next() => match inbound {
                    Some(Ok(msg)) => {
                        session.read().touch();
                        debug!(%id, raw = %msg, "received");

                        // The writer handle is fetched per dispatch; once the
                        // registry drops it (reap, teardown) the outbound
                        // queue closes and the loop below ends.
                        let Some(tx) = registry.sender(id) else {
                            break;
                        };
                        let mut ctx = Context {
                            id,
                            registry: &registry,
                            sender: &tx,
                        };

                        match dispatcher.dispatch(&mut ctx, &msg).await {
                            Ok(()) => {}
                            Err(HandlerError::Quit(reason)) => {
                                info!(%id, reason = ?reason, "client quit");
                                drain_outbound(&mut rx, &mut framed).await;
                                break;
                            }
                            Err(e) => {
                                debug!(%id, error = %e, "terminating after handler error");
                                break;
                            }
                        }
                    }
                    Some(Err(e)) => match read_error_action(&registry, id, &e) {
                        ReadErrorAction::Recoverable(reply) => {
                            if let Some(reply) = reply {
                                if let Some(tx) = registry.sender(id) {
                                    let _ = tx.send(Arc::new(reply)).await;
                                }
                            }
                        }
                        ReadErrorAction::Fatal => {
                            warn!(%id, error = %e, "fatal read error");
                            break;
                        }
                    },
                    None => {
                        debug!(%id, "peer closed connection");
                        break;
                    }
                },
                outbound = rx.recv() => match outbound {
                    Some(msg) => {
                        if let Err(e) = framed.send(&*msg).await {
                            debug!(%id, error = %e, "write failed");
                            break;
                        }
                    }
                    // The registry dropped our writer: reaped or torn down.
                    None => {
                        debug!(%id, "writer closed by registry");
                        break;
                    }
                },
                _ = shutdown_rx.recv() => {
                    debug!(%id, "shutdown signal");
                    break;
                }
            }
        }

        registry.remove_session(id).await;
        Ok(())
    }
}

/// Classify a decode error: parse problems get a numeric (or are dropped),
/// transport problems end the connection.
fn read_error_action(registry: &Registry, id: SessionId, e: &ProtocolError) -> ReadErrorAction {
    match e {
        ProtocolError::InvalidMessage { string, cause } => {
            let nick = registry.nick_of(id).unwrap_or_else(|| "*".to_string());
            match cause {
                // A NICK with no argument has its own numeric.
                MessageParseError::MissingParams { command } if command == "NICK" => {
                    ReadErrorAction::Recoverable(Some(Message::reply(
                        &registry.server_name,
                        Response::ERR_NONICKNAMEGIVEN,
                        vec![nick],
                        Some("No nickname given".to_string()),
                    )))
                }
                MessageParseError::MissingParams { command } => {
                    ReadErrorAction::Recoverable(Some(Message::reply(
                        &registry.server_name,
                        Response::ERR_NEEDMOREPARAMS,
                        vec![nick, command.clone()],
                        Some("Not enough parameters".to_string()),
                    )))
                }
                // A mode flag outside {+b,-b,+m,-m} is a malformed MODE.
                MessageParseError::InvalidModeString { .. } => {
                    ReadErrorAction::Recoverable(Some(Message::reply(
                        &registry.server_name,
                        Response::ERR_NEEDMOREPARAMS,
                        vec![nick, "MODE".to_string()],
                        Some("Not enough parameters".to_string()),
                    )))
                }
                _ => {
                    debug!(%id, line = %string, "ignoring malformed line");
                    ReadErrorAction::Recoverable(None)
                }
            }
        }
        ProtocolError::InvalidUtf8 { details, .. } => {
            debug!(%id, details = %details, "ignoring non-utf8 line");
            ReadErrorAction::Recoverable(None)
        }
        ProtocolError::MessageTooLong { .. } | ProtocolError::Io(_) => ReadErrorAction::Fatal,
    }
}

/// Flush whatever is already queued before closing the socket, so a quitting
/// client still sees replies to its final commands.
async fn drain_outbound(
    rx: &mut mpsc::Receiver<Arc<Message>>,
    framed: &mut Framed<TcpStream, IrcCodec>,
) {
    while let Ok(msg) = rx.try_recv() {
        // Each send flushes, so the last reply is on the wire before close.
        if framed.send(&*msg).await.is_err() {
            break;
        }
    }
}
