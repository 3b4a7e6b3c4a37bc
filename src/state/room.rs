//! Room state: member set, topic, and nickname access lists.

use std::collections::HashSet;

use crate::state::SessionId;

/// A named fan-out group of sessions.
///
/// Ban and mute lists are keyed by nickname, not by session identity, so a
/// ban does not survive the target's nickname change. All set mutations are
/// idempotent; retry after a lost race is safe.
#[derive(Debug)]
pub struct Room {
    /// Canonical room name, `#`-prefixed.
    pub name: String,
    members: HashSet<SessionId>,
    pub topic: Option<String>,
    banned: HashSet<String>,
    muted: HashSet<String>,
}

impl Room {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: HashSet::new(),
            topic: None,
            banned: HashSet::new(),
            muted: HashSet::new(),
        }
    }

    /// Add a member. Returns false if already present.
    pub fn join(&mut self, id: SessionId) -> bool {
        self.members.insert(id)
    }

    /// Remove a member. Returns false if absent.
    pub fn part(&mut self, id: SessionId) -> bool {
        self.members.remove(&id)
    }

    pub fn is_member(&self, id: SessionId) -> bool {
        self.members.contains(&id)
    }

    /// Snapshot of the member set, taken under the room lock so sends can
    /// happen unlocked.
    pub fn member_ids(&self) -> Vec<SessionId> {
        self.members.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_banned(&self, nick: &str) -> bool {
        self.banned.contains(nick)
    }

    pub fn is_muted(&self, nick: &str) -> bool {
        self.muted.contains(nick)
    }

    pub fn ban(&mut self, nick: &str) -> bool {
        self.banned.insert(nick.to_string())
    }

    pub fn unban(&mut self, nick: &str) -> bool {
        self.banned.remove(nick)
    }

    pub fn mute(&mut self, nick: &str) -> bool {
        self.muted.insert(nick.to_string())
    }

    pub fn unmute(&mut self, nick: &str) -> bool {
        self.muted.remove(nick)
    }
}
