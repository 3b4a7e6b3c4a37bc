//! Per-connection session record and identifier generation.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

/// Opaque identifier for one live connection.
///
/// Sessions are keyed by this, never by remote address: addresses are not
/// identities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic generator for [`SessionId`]s.
pub struct SessionIdGenerator {
    next: AtomicU64,
}

impl SessionIdGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> SessionId {
        SessionId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SessionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// One live client connection and its registration state.
///
/// The activity stamp is atomic so `touch` works through a read lock;
/// strict consistency is not required for idle accounting.
#[derive(Debug)]
pub struct Session {
    pub addr: SocketAddr,
    /// Nickname, set by NICK.
    pub nick: Option<String>,
    /// Username, set by USER.
    pub user: Option<String>,
    /// True once NICK and USER have both been accepted.
    pub registered: bool,
    /// Last inbound activity, unix millis.
    last_activity: AtomicI64,
}

impl Session {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            nick: None,
            user: None,
            registered: false,
            last_activity: AtomicI64::new(now_millis()),
        }
    }

    /// Record inbound activity now.
    pub fn touch(&self) {
        self.last_activity.store(now_millis(), Ordering::Relaxed);
    }

    /// How long this session has been idle.
    pub fn idle_for(&self) -> Duration {
        let elapsed = now_millis().saturating_sub(self.last_activity.load(Ordering::Relaxed));
        Duration::from_millis(elapsed.max(0) as u64)
    }

    /// Whether NICK and USER are both present but registration has not been
    /// completed yet.
    pub fn can_register(&self) -> bool {
        self.nick.is_some() && self.user.is_some() && !self.registered
    }

    /// The nickname, or `*` for error replies before NICK.
    pub fn nick_or_star(&self) -> &str {
        self.nick.as_deref().unwrap_or("*")
    }
}
