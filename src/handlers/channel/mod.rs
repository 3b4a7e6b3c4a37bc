//! Room command handlers.

mod join;
mod kick;
mod mode;
mod names;
mod part;
mod topic;

pub use join::JoinHandler;
pub use kick::KickHandler;
pub use mode::ModeHandler;
pub use names::NamesHandler;
pub use part::PartHandler;
pub use topic::TopicHandler;
