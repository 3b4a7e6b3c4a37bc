//! State management: the registry and the entities it indexes.

mod registry;
mod room;
mod session;

pub use registry::{AssignedNick, Registry};
pub use room::Room;
pub use session::{Session, SessionId, SessionIdGenerator};
