//! Reply constructors shared across handlers.

use minirc_proto::{Message, Response};

pub fn err_nosuchnick(server_name: &str, nick: &str, target: &str) -> Message {
    Message::reply(
        server_name,
        Response::ERR_NOSUCHNICK,
        vec![nick.to_string(), target.to_string()],
        Some("No such nick/channel".to_string()),
    )
}

pub fn err_nosuchchannel(server_name: &str, nick: &str, channel: &str) -> Message {
    Message::reply(
        server_name,
        Response::ERR_NOSUCHCHANNEL,
        vec![nick.to_string(), channel.to_string()],
        Some("No such channel".to_string()),
    )
}

pub fn err_cannotsendtochan(server_name: &str, nick: &str, channel: &str) -> Message {
    Message::reply(
        server_name,
        Response::ERR_CANNOTSENDTOCHAN,
        vec![nick.to_string(), channel.to_string()],
        Some("Cannot send to channel".to_string()),
    )
}

pub fn err_unknowncommand(server_name: &str, nick: &str, verb: &str) -> Message {
    Message::reply(
        server_name,
        Response::ERR_UNKNOWNCOMMAND,
        vec![nick.to_string(), verb.to_string()],
        Some("Unknown command".to_string()),
    )
}

pub fn err_notonchannel(server_name: &str, nick: &str, channel: &str) -> Message {
    Message::reply(
        server_name,
        Response::ERR_NOTONCHANNEL,
        vec![nick.to_string(), channel.to_string()],
        Some("You're not on that channel".to_string()),
    )
}

pub fn err_bannedfromchan(server_name: &str, nick: &str, channel: &str) -> Message {
    Message::reply(
        server_name,
        Response::ERR_BANNEDFROMCHAN,
        vec![nick.to_string(), channel.to_string()],
        Some("Cannot join channel (banned)".to_string()),
    )
}

pub fn err_noprivileges(server_name: &str, nick: &str, channel: &str) -> Message {
    Message::reply(
        server_name,
        Response::ERR_NOPRIVILEGES,
        vec![nick.to_string(), channel.to_string()],
        Some("Permission Denied".to_string()),
    )
}

/// The 353/366 pair answering a NAMES query.
pub fn names_replies(
    server_name: &str,
    nick: &str,
    channel: &str,
    names: &[String],
) -> (Message, Message) {
    let namreply = Message::reply(
        server_name,
        Response::RPL_NAMREPLY,
        vec![nick.to_string(), "=".to_string(), channel.to_string()],
        Some(names.join(" ")),
    );
    let endofnames = Message::reply(
        server_name,
        Response::RPL_ENDOFNAMES,
        vec![nick.to_string(), channel.to_string()],
        Some("End of /NAMES list.".to_string()),
    );
    (namreply, endofnames)
}
