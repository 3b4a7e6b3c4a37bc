//! Network plumbing: the acceptor and the per-connection event loop.

mod connection;
mod gateway;

pub use connection::Connection;
pub use gateway::Gateway;
