//! Message prefix (source) type.

use std::fmt;

/// The source of a message, written as `:<source>` on the wire.
///
/// This protocol subset only ever emits a bare server host or a bare
/// nickname; there is no `nick!user@host` form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prefix {
    /// A server host (used for all numeric replies and NOTICEs).
    ServerName(String),
    /// A client nickname (used for relayed commands: JOIN, PART, PRIVMSG...).
    Nickname(String),
}

impl Prefix {
    /// Classify a raw prefix token.
    ///
    /// Hosts contain `.` or `:` (domain names, IPv4, IPv6); nicknames never
    /// do in this protocol subset.
    pub fn new_from_str(s: &str) -> Prefix {
        if s.contains('.') || s.contains(':') {
            Prefix::ServerName(s.to_string())
        } else {
            Prefix::Nickname(s.to_string())
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname(nick) => f.write_str(nick),
        }
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Prefix::new_from_str(s)
    }
}
