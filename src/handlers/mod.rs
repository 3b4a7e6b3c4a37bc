//! Command handlers and dispatch.

pub mod channel;
pub mod connection;
mod context;
mod dispatcher;
pub mod helpers;
pub mod messaging;

pub use context::Context;
pub use dispatcher::{Dispatcher, Handler};
