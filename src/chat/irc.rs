//! IRCv3 line parsing and formatting.
//!
//! Only the subset of the protocol needed by the chat client is covered:
//! message tags, prefix, command and parameters (with a trailing parameter).

use std::collections::HashMap;

/// One parsed IRC line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IrcMessage {
    pub tags: HashMap<String, String>,
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

impl IrcMessage {
    /// Parse a single line (without the trailing CRLF).
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);
        let mut message = IrcMessage::default();

        if let Some(stripped) = rest.strip_prefix('@') {
            let (raw_tags, tail) = stripped.split_once(' ')?;
            message.tags = parse_tags(raw_tags);
            rest = tail.trim_start();
        }

        if let Some(stripped) = rest.strip_prefix(':') {
            let (prefix, tail) = stripped.split_once(' ')?;
            message.prefix = Some(prefix.to_string());
            rest = tail.trim_start();
        }

        let (command, mut params) = match rest.split_once(' ') {
            Some((command, tail)) => (command, tail),
            None => (rest, ""),
        };
        if command.is_empty() {
            return None;
        }
        message.command = command.to_string();

        while !params.is_empty() {
            params = params.trim_start();
            if let Some(trailing) = params.strip_prefix(':') {
                message.params.push(trailing.to_string());
                break;
            }
            match params.split_once(' ') {
                Some((param, tail)) => {
                    message.params.push(param.to_string());
                    params = tail;
                }
                None => {
                    if !params.is_empty() {
                        message.params.push(params.to_string());
                    }
                    break;
                }
            }
        }

        Some(message)
    }

    /// Nickname part of the prefix (`nick!user@host`).
    pub fn nick(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .map(|prefix| prefix.split('!').next().unwrap_or(prefix))
    }

    /// Channel name without the leading `#`, for channel-targeted commands.
    pub fn channel(&self) -> Option<&str> {
        self.params
            .first()
            .and_then(|target| target.strip_prefix('#'))
    }

    /// Trailing parameter (the message text for PRIVMSG).
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }
}

fn parse_tags(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), unescape_tag_value(value)),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Replace line breaks so a reply can't inject extra IRC commands.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

pub fn privmsg(room: &str, text: &str) -> String {
    format!("PRIVMSG #{} :{}", room, single_line(text))
}

pub fn join(room: &str) -> String {
    format!("JOIN #{}", room)
}

pub fn part(room: &str) -> String {
    format!("PART #{}", room)
}

pub fn pong(token: &str) -> String {
    format!("PONG :{}", token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_privmsg_with_tags() {
        let line = "@badges=broadcaster/1;display-name=Some\\sUser;mod=0;user-id=42 :someuser!someuser@someuser.tmi.twitch.tv PRIVMSG #room :!fm song now\r\n";
        let msg = IrcMessage::parse(line).unwrap();

        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.nick(), Some("someuser"));
        assert_eq!(msg.channel(), Some("room"));
        assert_eq!(msg.trailing(), Some("!fm song now"));
        assert_eq!(msg.tags.get("display-name").map(String::as_str), Some("Some User"));
        assert_eq!(msg.tags.get("user-id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_parse_ping() {
        let msg = IrcMessage::parse("PING :tmi.twitch.tv").unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params, vec!["tmi.twitch.tv"]);
        assert!(msg.prefix.is_none());
    }

    #[test]
    fn test_parse_middle_params() {
        let msg = IrcMessage::parse(":tmi.twitch.tv 001 bot :Welcome, GLHF!").unwrap();
        assert_eq!(msg.command, "001");
        assert_eq!(msg.params, vec!["bot", "Welcome, GLHF!"]);

        let msg = IrcMessage::parse(":bot!bot@bot.tmi.twitch.tv JOIN #room").unwrap();
        assert_eq!(msg.params, vec!["#room"]);
        assert_eq!(msg.channel(), Some("room"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(IrcMessage::parse("").is_none());
        assert!(IrcMessage::parse("@only-tags").is_none());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_tag_value("a\\:b\\sc\\\\d"), "a;b c\\d");
    }

    #[test]
    fn test_privmsg_is_single_line() {
        assert_eq!(privmsg("room", "hi\r\nJOIN #other"), "PRIVMSG #room :hi  JOIN #other");
    }
}
