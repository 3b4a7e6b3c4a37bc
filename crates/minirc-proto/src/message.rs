//! The owned message model and its line parser.

use std::fmt;
use std::str::FromStr;

use nom::{
    bytes::complete::take_while1, character::complete::char, combinator::opt,
    sequence::preceded, IResult,
};

use crate::command::Command;
use crate::error::MessageParseError;
use crate::prefix::Prefix;
use crate::response::Response;

/// One protocol message: an optional source prefix and a command.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// The message source, written as `:<source>` on the wire.
    pub prefix: Option<Prefix>,
    /// The command and its parameters.
    pub command: Command,
}

impl Message {
    /// Build a server numeric reply.
    ///
    /// `params` are middle parameters; `trailing`, if present, is written
    /// with a `:` prefix.
    pub fn reply(
        server_name: &str,
        code: Response,
        params: Vec<String>,
        trailing: Option<String>,
    ) -> Message {
        Message {
            prefix: Some(Prefix::ServerName(server_name.to_string())),
            command: Command::Response(code, params, trailing),
        }
    }

    /// Build a server NOTICE to a client.
    pub fn notice(server_name: &str, target: &str, text: &str) -> Message {
        Message {
            prefix: Some(Prefix::ServerName(server_name.to_string())),
            command: Command::NOTICE(target.to_string(), text.to_string()),
        }
    }

    /// Build a command relayed on behalf of a client, prefixed `:<nick>`.
    pub fn from_nick(nick: &str, command: Command) -> Message {
        Message {
            prefix: Some(Prefix::Nickname(nick.to_string())),
            command,
        }
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Message {
        Message {
            prefix: None,
            command,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}", self.command)
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Message, MessageParseError> {
        let line = s.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let parsed = parse_message(line).map_err(|_| MessageParseError::InvalidCommand)?.1;
        let command = Command::new(parsed.command, parsed.params)?;

        Ok(Message {
            prefix: parsed.prefix.map(Prefix::new_from_str),
            command,
        })
    }
}

/// Parse the optional message prefix (after `:`, before the first space).
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Parse the command token (1*letter or 3digit).
fn parse_command_token(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)?;

    let is_word = cmd.chars().all(|c| c.is_ascii_alphabetic() || c == '_');
    let is_three_digits = cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit());

    if is_word || is_three_digits {
        Ok((rest, cmd))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::AlphaNumeric,
        )))
    }
}

/// Parse parameters: space-separated tokens, with an optional trailing
/// parameter introduced by `:` that runs to end of line. Consecutive spaces
/// collapse.
fn parse_params(input: &str) -> (&str, Vec<&str>) {
    let mut params = Vec::new();
    let mut rest = input;

    while rest.as_bytes().first() == Some(&b' ') {
        while rest.as_bytes().first() == Some(&b' ') {
            rest = &rest[1..];
        }
        if rest.is_empty() {
            break;
        }

        if let Some(stripped) = rest.strip_prefix(':') {
            params.push(stripped);
            rest = "";
            break;
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    (rest, params)
}

struct ParsedLine<'a> {
    prefix: Option<&'a str>,
    command: &'a str,
    params: Vec<&'a str>,
}

fn parse_message(input: &str) -> IResult<&str, ParsedLine<'_>> {
    let (input, prefix) = opt(parse_prefix)(input)?;
    let input = input.trim_start_matches(' ');
    let (input, command) = parse_command_token(input)?;
    let (rest, params) = parse_params(input);

    Ok((
        rest,
        ParsedLine {
            prefix,
            command,
            params,
        },
    ))
}
