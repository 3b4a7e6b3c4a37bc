//! Connection and registration command handlers.

mod botauth;
mod nick;
mod quit;
mod user;

pub use botauth::BotAuthHandler;
pub use nick::NickHandler;
pub use quit::QuitHandler;
pub use user::UserHandler;
