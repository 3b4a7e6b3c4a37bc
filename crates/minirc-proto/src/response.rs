//! Numeric reply vocabulary.
//!
//! The fixed set of three-digit response codes the server emits. Codes are
//! formatted zero-padded to three digits on the wire.

#![allow(non_camel_case_types)]

use std::fmt;

/// A server numeric reply code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum Response {
    /// 001 - Welcome to the server
    RPL_WELCOME = 1,
    /// 002 - Your host is ...
    RPL_YOURHOST = 2,
    /// 004 - Server info
    RPL_MYINFO = 4,
    /// 324 - Channel mode change notification
    RPL_CHANNELMODEIS = 324,
    /// 331 - No topic is set
    RPL_NOTOPIC = 331,
    /// 332 - Channel topic
    RPL_TOPIC = 332,
    /// 353 - NAMES reply
    RPL_NAMREPLY = 353,
    /// 366 - End of NAMES list
    RPL_ENDOFNAMES = 366,
    /// 401 - No such nick/channel
    ERR_NOSUCHNICK = 401,
    /// 403 - No such channel
    ERR_NOSUCHCHANNEL = 403,
    /// 404 - Cannot send to channel
    ERR_CANNOTSENDTOCHAN = 404,
    /// 421 - Unknown command
    ERR_UNKNOWNCOMMAND = 421,
    /// 431 - No nickname given
    ERR_NONICKNAMEGIVEN = 431,
    /// 433 - Nickname is already in use
    ERR_NICKNAMEINUSE = 433,
    /// 442 - You're not on that channel
    ERR_NOTONCHANNEL = 442,
    /// 451 - You have not registered
    ERR_NOTREGISTERED = 451,
    /// 461 - Not enough parameters
    ERR_NEEDMOREPARAMS = 461,
    /// 478 - Cannot join channel (banned)
    ERR_BANNEDFROMCHAN = 478,
    /// 481 - Permission denied
    ERR_NOPRIVILEGES = 481,
    /// 900 - Bot authentication succeeded
    RPL_BOTAUTH = 900,
}

impl Response {
    /// The numeric code as a plain integer.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Whether this code is an error reply (4xx/5xx).
    pub fn is_error(self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}
