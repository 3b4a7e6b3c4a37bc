//! Typed commands and their wire serialization.

use std::fmt;

use crate::error::MessageParseError;
use crate::mode::ModeChange;
use crate::response::Response;

/// Check if a string must be colon-prefixed when written as a trailing
/// argument.
fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

/// An IRC command with its parameters.
///
/// Client-to-server verbs parse into dedicated variants; anything else lands
/// in [`Command::Raw`] so the dispatcher can answer 421. Server-to-client
/// numerics are built with [`Command::Response`], which separates middle
/// parameters from the optional trailing parameter so reply lines come out
/// byte-exact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `NICK <nickname>`
    NICK(String),
    /// `USER <user> <mode> <unused> :<realname>` (the unused token is dropped)
    USER(String, String, String),
    /// `JOIN <#channel>`
    JOIN(String),
    /// `PART <#channel>`
    PART(String),
    /// `PRIVMSG <target> :<text>`
    PRIVMSG(String, String),
    /// `NOTICE <target> :<text>`
    NOTICE(String, String),
    /// `TOPIC <#channel> [:<topic>]`
    TOPIC(String, Option<String>),
    /// `NAMES <#channel>`
    NAMES(String),
    /// `KICK <#channel> <nickname> [:<reason>]`
    KICK(String, String, Option<String>),
    /// `MODE <#channel> <flag> <nickname>`
    MODE(String, ModeChange, String),
    /// `QUIT [:<message>]`
    QUIT(Option<String>),
    /// `BOT_AUTH <secret>`
    BOTAUTH(String),
    /// A numeric reply: code, middle parameters, optional trailing parameter.
    Response(Response, Vec<String>, Option<String>),
    /// Any verb the server does not understand.
    Raw(String, Vec<String>),
}

impl Command {
    /// Build a command from a verb token and its parameters.
    ///
    /// The verb is matched case-insensitively. Unknown verbs become
    /// [`Command::Raw`]; known verbs with missing required parameters are an
    /// error.
    pub fn new(cmd: &str, args: Vec<&str>) -> Result<Command, MessageParseError> {
        let verb = cmd.to_ascii_uppercase();
        let missing = || MessageParseError::MissingParams {
            command: verb.clone(),
        };

        let command = match verb.as_str() {
            "NICK" => Command::NICK(args.first().ok_or_else(missing)?.to_string()),
            "USER" => {
                if args.len() < 4 {
                    return Err(missing());
                }
                Command::USER(
                    args[0].to_string(),
                    args[1].to_string(),
                    args[3].to_string(),
                )
            }
            "JOIN" => Command::JOIN(args.first().ok_or_else(missing)?.to_string()),
            "PART" => Command::PART(args.first().ok_or_else(missing)?.to_string()),
            "PRIVMSG" => {
                if args.len() < 2 {
                    return Err(missing());
                }
                Command::PRIVMSG(args[0].to_string(), args[1].to_string())
            }
            "NOTICE" => {
                if args.len() < 2 {
                    return Err(missing());
                }
                Command::NOTICE(args[0].to_string(), args[1].to_string())
            }
            "TOPIC" => Command::TOPIC(
                args.first().ok_or_else(missing)?.to_string(),
                args.get(1).map(|s| s.to_string()),
            ),
            "NAMES" => Command::NAMES(args.first().ok_or_else(missing)?.to_string()),
            "KICK" => {
                if args.len() < 2 {
                    return Err(missing());
                }
                Command::KICK(
                    args[0].to_string(),
                    args[1].to_string(),
                    args.get(2).map(|s| s.to_string()),
                )
            }
            "MODE" => {
                if args.len() < 3 {
                    return Err(missing());
                }
                Command::MODE(args[0].to_string(), args[1].parse()?, args[2].to_string())
            }
            "QUIT" => Command::QUIT(args.first().map(|s| s.to_string())),
            "BOT_AUTH" => Command::BOTAUTH(args.first().ok_or_else(missing)?.to_string()),
            _ => Command::Raw(verb, args.into_iter().map(String::from).collect()),
        };

        Ok(command)
    }

    /// The verb name, as used in 421 replies and dispatch tables.
    pub fn name(&self) -> &str {
        match self {
            Command::NICK(_) => "NICK",
            Command::USER(..) => "USER",
            Command::JOIN(_) => "JOIN",
            Command::PART(_) => "PART",
            Command::PRIVMSG(..) => "PRIVMSG",
            Command::NOTICE(..) => "NOTICE",
            Command::TOPIC(..) => "TOPIC",
            Command::NAMES(_) => "NAMES",
            Command::KICK(..) => "KICK",
            Command::MODE(..) => "MODE",
            Command::QUIT(_) => "QUIT",
            Command::BOTAUTH(_) => "BOT_AUTH",
            Command::Response(..) => "RESPONSE",
            Command::Raw(verb, _) => verb,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NICK(nick) => write!(f, "NICK :{}", nick),
            Command::USER(user, mode, realname) => {
                write!(f, "USER {} {} * :{}", user, mode, realname)
            }
            Command::JOIN(chan) => write!(f, "JOIN {}", chan),
            Command::PART(chan) => write!(f, "PART {}", chan),
            Command::PRIVMSG(target, text) => write!(f, "PRIVMSG {} :{}", target, text),
            Command::NOTICE(target, text) => write!(f, "NOTICE {} :{}", target, text),
            Command::TOPIC(chan, Some(topic)) => write!(f, "TOPIC {} :{}", chan, topic),
            Command::TOPIC(chan, None) => write!(f, "TOPIC {}", chan),
            Command::NAMES(chan) => write!(f, "NAMES {}", chan),
            Command::KICK(chan, nick, Some(reason)) => {
                write!(f, "KICK {} {} :{}", chan, nick, reason)
            }
            Command::KICK(chan, nick, None) => write!(f, "KICK {} {}", chan, nick),
            Command::MODE(chan, change, target) => {
                write!(f, "MODE {} {} {}", chan, change, target)
            }
            Command::QUIT(Some(msg)) => write!(f, "QUIT :{}", msg),
            Command::QUIT(None) => f.write_str("QUIT"),
            Command::BOTAUTH(secret) => write!(f, "BOT_AUTH {}", secret),
            Command::Response(code, params, trailing) => {
                write!(f, "{}", code)?;
                for param in params {
                    write!(f, " {}", param)?;
                }
                if let Some(trailing) = trailing {
                    write!(f, " :{}", trailing)?;
                }
                Ok(())
            }
            Command::Raw(verb, params) => {
                f.write_str(verb)?;
                for (i, param) in params.iter().enumerate() {
                    f.write_str(" ")?;
                    if i == params.len() - 1 && needs_colon_prefix(param) {
                        f.write_str(":")?;
                    }
                    f.write_str(param)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ModeFlag;

    #[test]
    fn parses_registration_verbs() {
        assert_eq!(
            Command::new("NICK", vec!["alice"]).unwrap(),
            Command::NICK("alice".to_string())
        );
        assert_eq!(
            Command::new("USER", vec!["alice", "0", "*", "Alice"]).unwrap(),
            Command::USER("alice".to_string(), "0".to_string(), "Alice".to_string())
        );
    }

    #[test]
    fn verb_matching_is_case_insensitive() {
        assert_eq!(
            Command::new("join", vec!["#room"]).unwrap(),
            Command::JOIN("#room".to_string())
        );
        assert_eq!(
            Command::new("PrivMsg", vec!["#room", "hi"]).unwrap(),
            Command::PRIVMSG("#room".to_string(), "hi".to_string())
        );
    }

    #[test]
    fn missing_params_is_an_error() {
        for (verb, args) in [
            ("NICK", vec![]),
            ("USER", vec!["alice", "0", "*"]),
            ("PRIVMSG", vec!["#room"]),
            ("MODE", vec!["#room", "+b"]),
            ("KICK", vec!["#room"]),
        ] {
            let err = Command::new(verb, args).unwrap_err();
            assert!(
                matches!(err, MessageParseError::MissingParams { ref command } if command == verb),
                "wrong error for {}: {:?}",
                verb,
                err
            );
        }
    }

    #[test]
    fn unknown_verbs_become_raw() {
        let cmd = Command::new("whois", vec!["alice"]).unwrap();
        assert_eq!(
            cmd,
            Command::Raw("WHOIS".to_string(), vec!["alice".to_string()])
        );
        assert_eq!(cmd.name(), "WHOIS");
    }

    #[test]
    fn parses_mode_flags() {
        let cmd = Command::new("MODE", vec!["#room", "+b", "alice"]).unwrap();
        match cmd {
            Command::MODE(chan, change, target) => {
                assert_eq!(chan, "#room");
                assert!(change.grant);
                assert_eq!(change.flag, ModeFlag::Ban);
                assert_eq!(target, "alice");
            }
            other => panic!("expected MODE, got {:?}", other),
        }
        assert!(Command::new("MODE", vec!["#room", "+x", "alice"]).is_err());
    }

    #[test]
    fn relayed_commands_serialize_to_wire_formats() {
        assert_eq!(Command::JOIN("#room".into()).to_string(), "JOIN #room");
        assert_eq!(Command::PART("#room".into()).to_string(), "PART #room");
        assert_eq!(
            Command::PRIVMSG("#room".into(), "hi".into()).to_string(),
            "PRIVMSG #room :hi"
        );
        assert_eq!(
            Command::TOPIC("#room".into(), Some("news".into())).to_string(),
            "TOPIC #room :news"
        );
        assert_eq!(
            Command::KICK("#room".into(), "bob".into(), Some("Kicked by alice".into()))
                .to_string(),
            "KICK #room bob :Kicked by alice"
        );
        assert_eq!(
            Command::QUIT(Some("Client Quit".into())).to_string(),
            "QUIT :Client Quit"
        );
        assert_eq!(Command::NICK("bob".into()).to_string(), "NICK :bob");
    }

    #[test]
    fn responses_keep_middle_and_trailing_separate() {
        // The 004 host is a middle parameter even when it starts with a colon.
        let myinfo = Command::Response(
            Response::RPL_MYINFO,
            vec!["alice".to_string(), "::1".to_string()],
            None,
        );
        assert_eq!(myinfo.to_string(), "004 alice ::1");

        // The 353 name list is always trailing, even for a single nick.
        let names = Command::Response(
            Response::RPL_NAMREPLY,
            vec!["bob".to_string(), "=".to_string(), "#room".to_string()],
            Some("bob".to_string()),
        );
        assert_eq!(names.to_string(), "353 bob = #room :bob");
    }
}
