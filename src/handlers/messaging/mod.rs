//! Messaging command handlers.

mod privmsg;

pub use privmsg::PrivmsgHandler;
