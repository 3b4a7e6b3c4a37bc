//! The process-wide state indexes.
//!
//! The `Registry` owns every session and room and enforces the cross-index
//! invariants: a nickname maps to at most one live session, a room is
//! reachable iff it has members, and a disconnected session leaves no
//! entries behind. Per-entity locks are only held across in-memory work;
//! recipient lists are copied out before any send.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use minirc_proto::{Command, Message};
use parking_lot::RwLock;
use rand::Rng;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::state::{Room, Session, SessionId, SessionIdGenerator};

/// Outcome of a nickname assignment.
pub struct AssignedNick {
    /// The nickname actually assigned.
    pub nick: String,
    /// True when a collision forced a suffixed rename.
    pub renamed: bool,
}

/// Process-wide session, nickname, and room indexes.
pub struct Registry {
    /// Host string used as the prefix of every server-originated line.
    pub server_name: String,
    sessions: DashMap<SessionId, Arc<RwLock<Session>>>,
    senders: DashMap<SessionId, mpsc::Sender<Arc<Message>>>,
    nicks: DashMap<String, SessionId>,
    rooms: DashMap<String, Arc<RwLock<Room>>>,
    id_gen: SessionIdGenerator,
    bot_secret: Option<String>,
    bot_nick: RwLock<Option<String>>,
    /// Broadcast used to stop the acceptor, connections, and the reaper.
    pub shutdown_tx: broadcast::Sender<()>,
}

impl Registry {
    pub fn new(server_name: String, bot_secret: Option<String>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(8);
        Self {
            server_name,
            sessions: DashMap::new(),
            senders: DashMap::new(),
            nicks: DashMap::new(),
            rooms: DashMap::new(),
            id_gen: SessionIdGenerator::new(),
            bot_secret,
            bot_nick: RwLock::new(None),
            shutdown_tx,
        }
    }

    pub fn next_session_id(&self) -> SessionId {
        self.id_gen.next_id()
    }

    /// Register a freshly accepted connection.
    pub fn add_session(
        &self,
        id: SessionId,
        addr: SocketAddr,
        tx: mpsc::Sender<Arc<Message>>,
    ) -> Arc<RwLock<Session>> {
        let session = Arc::new(RwLock::new(Session::new(addr)));
        self.sessions.insert(id, session.clone());
        self.senders.insert(id, tx);
        session
    }

    pub fn session(&self, id: SessionId) -> Option<Arc<RwLock<Session>>> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// The per-dispatch writer handle for a session, if it is still live.
    pub fn sender(&self, id: SessionId) -> Option<mpsc::Sender<Arc<Message>>> {
        self.senders.get(&id).map(|entry| entry.value().clone())
    }

    pub fn find_by_nick(&self, nick: &str) -> Option<SessionId> {
        self.nicks.get(nick).map(|entry| *entry.value())
    }

    pub fn nick_of(&self, id: SessionId) -> Option<String> {
        self.session(id).and_then(|session| session.read().nick.clone())
    }

    pub fn live_sessions(&self) -> Vec<(SessionId, Arc<RwLock<Session>>)> {
        self.sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Assign `wanted` to the session, suffixing with a random value in
    /// [1000, 9999] until unique. The claim goes through the nick index's
    /// entry API so two sessions cannot both win the same name.
    pub fn assign_nick(&self, id: SessionId, wanted: &str) -> AssignedNick {
        if let Some(holder) = self.nicks.get(wanted) {
            if *holder.value() == id {
                return AssignedNick {
                    nick: wanted.to_string(),
                    renamed: false,
                };
            }
        }

        let mut candidate = wanted.to_string();
        let mut renamed = false;
        loop {
            match self.nicks.entry(candidate.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(id);
                    break;
                }
                Entry::Occupied(_) => {
                    candidate = format!("{}{}", wanted, rand::thread_rng().gen_range(1000..=9999));
                    renamed = true;
                }
            }
        }

        let Some(session) = self.session(id) else {
            // The session raced a disconnect; give the claim back.
            self.nicks.remove_if(&candidate, |_, holder| *holder == id);
            return AssignedNick {
                nick: candidate,
                renamed,
            };
        };

        let old = {
            let mut guard = session.write();
            guard.nick.replace(candidate.clone())
        };
        if let Some(old) = old {
            if old != candidate {
                self.nicks.remove_if(&old, |_, holder| *holder == id);
            }
        }

        AssignedNick {
            nick: candidate,
            renamed,
        }
    }

    pub fn get_room(&self, name: &str) -> Option<Arc<RwLock<Room>>> {
        self.rooms.get(name).map(|entry| entry.value().clone())
    }

    /// Fetch a room, creating it lazily on first JOIN.
    pub fn create_or_get_room(&self, name: &str) -> Arc<RwLock<Room>> {
        self.rooms
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(Room::new(name))))
            .clone()
    }

    /// Re-insert a room that a concurrent empty-room sweep may have removed
    /// between creation and the first join.
    pub fn ensure_room_reachable(&self, name: &str, room: &Arc<RwLock<Room>>) {
        self.rooms.entry(name.to_string()).or_insert_with(|| room.clone());
    }

    /// Drop a room from the index if its member set is empty.
    pub fn remove_room_if_empty(&self, name: &str) {
        if self
            .rooms
            .remove_if(name, |_, room| room.read().is_empty())
            .is_some()
        {
            debug!(room = %name, "room removed (empty)");
        }
    }

    /// Rooms this session is currently a member of.
    pub fn rooms_with_member(&self, id: SessionId) -> Vec<(String, Arc<RwLock<Room>>)> {
        self.rooms
            .iter()
            .filter(|entry| entry.value().read().is_member(id))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Every other session sharing at least one room with this one.
    pub fn peers_sharing_rooms(&self, id: SessionId) -> Vec<SessionId> {
        let mut peers = HashSet::new();
        for (_, room) in self.rooms_with_member(id) {
            peers.extend(room.read().member_ids());
        }
        peers.remove(&id);
        peers.into_iter().collect()
    }

    /// Resolve member ids to nicknames, skipping sessions torn down mid-scan.
    pub fn nicknames(&self, ids: &[SessionId]) -> Vec<String> {
        ids.iter().filter_map(|&id| self.nick_of(id)).collect()
    }

    /// Queue a line for one session. Failures are swallowed: a closed writer
    /// means the session is already on its way out.
    pub async fn send_to(&self, id: SessionId, msg: Arc<Message>) -> bool {
        let Some(tx) = self.sender(id) else {
            return false;
        };
        tx.send(msg).await.is_ok()
    }

    /// Fan a line out to a recipient list, optionally excluding one session.
    pub async fn broadcast(&self, ids: &[SessionId], msg: Arc<Message>, exclude: Option<SessionId>) {
        for &id in ids {
            if Some(id) == exclude {
                continue;
            }
            self.send_to(id, msg.clone()).await;
        }
    }

    /// The single disconnect path, used by QUIT, peer close, I/O errors, the
    /// idle reaper, and shutdown. Idempotent.
    ///
    /// Releases the nickname, pulls the session out of every room (deleting
    /// rooms that become empty), and tells each peer sharing a room exactly
    /// once via a QUIT broadcast.
    pub async fn remove_session(&self, id: SessionId) {
        let Some((_, session)) = self.sessions.remove(&id) else {
            return;
        };
        self.senders.remove(&id);

        let (nick, addr) = {
            let guard = session.read();
            (guard.nick.clone(), guard.addr)
        };
        if let Some(nick) = &nick {
            self.nicks.remove_if(nick, |_, holder| *holder == id);
            let mut bot = self.bot_nick.write();
            if bot.as_deref() == Some(nick.as_str()) {
                *bot = None;
            }
        }

        let mut peers = HashSet::new();
        for (name, room) in self.rooms_with_member(id) {
            let others = {
                let mut guard = room.write();
                guard.part(id);
                guard.member_ids()
            };
            peers.extend(others);
            self.remove_room_if_empty(&name);
        }

        if let Some(nick) = nick {
            let quit = Arc::new(Message::from_nick(
                &nick,
                Command::QUIT(Some("Client Quit".to_string())),
            ));
            for peer in peers {
                self.send_to(peer, quit.clone()).await;
            }
            info!(%id, nick = %nick, %addr, "session removed");
        } else {
            debug!(%id, %addr, "unregistered session removed");
        }
    }

    /// Check a BOT_AUTH secret. Always false when no secret is configured.
    pub fn verify_bot_secret(&self, secret: &str) -> bool {
        self.bot_secret.as_deref() == Some(secret)
    }

    /// Remember the authenticated bot nickname. At most one is kept.
    pub fn set_bot_nick(&self, nick: &str) {
        *self.bot_nick.write() = Some(nick.to_string());
    }

    pub fn is_bot(&self, nick: &str) -> bool {
        self.bot_nick.read().as_deref() == Some(nick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_registry() -> Registry {
        Registry::new("::1".to_string(), Some("hunter2".to_string()))
    }

    fn connect(registry: &Registry) -> (SessionId, mpsc::Receiver<Arc<Message>>) {
        let id = registry.next_session_id();
        let (tx, rx) = mpsc::channel(16);
        registry.add_session(id, "127.0.0.1:40000".parse().unwrap(), tx);
        (id, rx)
    }

    #[test]
    fn nick_collision_gets_a_numeric_suffix() {
        let registry = test_registry();
        let (alice, _rx_a) = connect(&registry);
        let (bob, _rx_b) = connect(&registry);

        let first = registry.assign_nick(alice, "alice");
        assert_eq!(first.nick, "alice");
        assert!(!first.renamed);

        let second = registry.assign_nick(bob, "alice");
        assert!(second.renamed);
        assert!(second.nick.starts_with("alice"));
        let suffix: u32 = second.nick["alice".len()..].parse().unwrap();
        assert!((1000..=9999).contains(&suffix));

        assert_eq!(registry.find_by_nick("alice"), Some(alice));
        assert_eq!(registry.find_by_nick(&second.nick), Some(bob));
    }

    #[test]
    fn renaming_releases_the_old_nick() {
        let registry = test_registry();
        let (alice, _rx) = connect(&registry);

        registry.assign_nick(alice, "alice");
        let renamed = registry.assign_nick(alice, "alicia");
        assert_eq!(renamed.nick, "alicia");
        assert!(!renamed.renamed);
        assert_eq!(registry.find_by_nick("alice"), None);
        assert_eq!(registry.find_by_nick("alicia"), Some(alice));
    }

    #[test]
    fn reassigning_own_nick_is_a_noop() {
        let registry = test_registry();
        let (alice, _rx) = connect(&registry);

        registry.assign_nick(alice, "alice");
        let again = registry.assign_nick(alice, "alice");
        assert_eq!(again.nick, "alice");
        assert!(!again.renamed);
    }

    #[tokio::test]
    async fn remove_session_frees_nick_and_rooms_and_quits_peers() {
        let registry = test_registry();
        let (alice, _rx_a) = connect(&registry);
        let (bob, mut rx_b) = connect(&registry);
        registry.assign_nick(alice, "alice");
        registry.assign_nick(bob, "bob");

        let room = registry.create_or_get_room("#room");
        {
            let mut guard = room.write();
            guard.join(alice);
            guard.join(bob);
        }

        registry.remove_session(alice).await;

        // Nick freed, session gone, room still reachable with bob inside.
        assert_eq!(registry.find_by_nick("alice"), None);
        assert!(registry.session(alice).is_none());
        let room = registry.get_room("#room").expect("room should survive");
        assert!(room.read().is_member(bob));
        assert!(!room.read().is_member(alice));

        // Bob got exactly one QUIT.
        let msg = rx_b.try_recv().expect("bob should receive the quit");
        assert_eq!(msg.to_string(), ":alice QUIT :Client Quit");
        assert!(rx_b.try_recv().is_err());

        // Removing bob too deletes the now-empty room.
        registry.remove_session(bob).await;
        assert!(registry.get_room("#room").is_none());

        // Idempotent.
        registry.remove_session(bob).await;
    }

    #[tokio::test]
    async fn remove_session_clears_bot_registration() {
        let registry = test_registry();
        let (bot, _rx) = connect(&registry);
        registry.assign_nick(bot, "helper");
        registry.set_bot_nick("helper");
        assert!(registry.is_bot("helper"));

        registry.remove_session(bot).await;
        assert!(!registry.is_bot("helper"));
    }

    #[test]
    fn bot_secret_verification() {
        let registry = test_registry();
        assert!(registry.verify_bot_secret("hunter2"));
        assert!(!registry.verify_bot_secret("wrong"));

        let no_secret = Registry::new("::1".to_string(), None);
        assert!(!no_secret.verify_bot_secret("hunter2"));
        assert!(!no_secret.verify_bot_secret(""));
    }
}
