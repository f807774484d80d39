//! Chat connection over IRC-on-WebSocket.
//!
//! # Responsibilities
//! - Authenticate, request tags capability and join channels
//! - Answer keep-alive pings
//! - Forward channel messages to the dispatcher
//! - Write queued outbound lines
//! - Reconnect with backoff until shutdown

use std::sync::Arc;

use dashmap::DashSet;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::chat::irc::{self, IrcMessage};
use crate::chat::ChatTags;
use crate::config::ChatConfig;
use crate::observability::metrics;
use crate::outbound::ReplySink;
use crate::resilience::backoff::calculate_backoff;

/// Error type for a chat session.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// A message posted in a joined channel.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Channel name without `#`.
    pub room: String,
    pub tags: ChatTags,
    pub text: String,
    /// Sent by the bot's own account.
    pub is_self: bool,
}

/// Channel membership operations used by commands.
pub trait ChatControl: Send + Sync {
    fn join(&self, room: &str);
    fn part(&self, room: &str);
    /// Joined channels, sorted.
    fn channels(&self) -> Vec<String>;
}

/// Cloneable handle for sending lines through the client.
#[derive(Clone)]
pub struct ChatHandle {
    outgoing: mpsc::UnboundedSender<String>,
    channels: Arc<DashSet<String>>,
}

impl ChatHandle {
    fn send(&self, line: String) {
        if self.outgoing.send(line).is_err() {
            tracing::warn!("Chat writer stopped, dropping outbound line");
        }
    }
}

impl ReplySink for ChatHandle {
    fn say(&self, room: &str, text: &str) {
        self.send(irc::privmsg(room, text));
    }
}

impl ChatControl for ChatHandle {
    fn join(&self, room: &str) {
        let room = normalize_room(room);
        if self.channels.insert(room.clone()) {
            tracing::info!(channel = %room, "Joining channel");
            self.send(irc::join(&room));
        }
    }

    fn part(&self, room: &str) {
        let room = normalize_room(room);
        if self.channels.remove(&room).is_some() {
            tracing::info!(channel = %room, "Leaving channel");
            self.send(irc::part(&room));
        }
    }

    fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.channels.iter().map(|c| c.key().clone()).collect();
        channels.sort();
        channels
    }
}

/// Lowercase and strip a leading `#`.
pub fn normalize_room(room: &str) -> String {
    room.trim_start_matches('#').to_lowercase()
}

enum SessionEnd {
    Shutdown,
    Reconnect,
}

enum LineOutcome {
    Nothing,
    Reply(String),
    Reconnect,
}

/// Owns the connection loop. Created together with its [`ChatHandle`].
pub struct ChatClient {
    config: ChatConfig,
    channels: Arc<DashSet<String>>,
    outgoing: mpsc::UnboundedReceiver<String>,
    inbound: mpsc::UnboundedSender<ChatMessage>,
}

impl ChatClient {
    /// Create the client, its handle and the stream of inbound messages.
    pub fn new(config: ChatConfig) -> (Self, ChatHandle, mpsc::UnboundedReceiver<ChatMessage>) {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let channels = Arc::new(DashSet::new());
        for channel in &config.channels {
            channels.insert(normalize_room(channel));
        }

        let handle = ChatHandle {
            outgoing: outgoing_tx,
            channels: channels.clone(),
        };

        (
            Self {
                config,
                channels,
                outgoing: outgoing_rx,
                inbound: inbound_tx,
            },
            handle,
            inbound_rx,
        )
    }

    /// Keep a session open until shutdown, reconnecting on failure.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        let mut attempt = 0u32;
        loop {
            match self.session(&mut shutdown, &mut attempt).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Reconnect) => {
                    tracing::warn!("Chat connection closed, reconnecting");
                }
                Err(e) => {
                    tracing::error!(error = %e, attempt = attempt, "Chat connection failed");
                }
            }

            attempt = attempt.saturating_add(1);
            metrics::record_chat_reconnect();
            let delay = calculate_backoff(
                attempt,
                self.config.reconnect_base_delay_ms,
                self.config.reconnect_max_delay_ms,
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.recv() => break,
            }
        }
        tracing::info!("Chat client stopped");
    }

    async fn session(
        &mut self,
        shutdown: &mut broadcast::Receiver<()>,
        attempt: &mut u32,
    ) -> Result<SessionEnd, ChatError> {
        tracing::info!(url = %self.config.url, "Connecting to chat");
        let (stream, _) = connect_async(self.config.url.as_str()).await?;
        let (mut write, mut read) = stream.split();

        for line in self.handshake() {
            write.send(Message::text(line)).await?;
        }
        *attempt = 0;

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        for line in text.as_str().lines() {
                            match handle_line(line, &self.inbound, &self.config.username) {
                                LineOutcome::Nothing => {}
                                LineOutcome::Reply(reply) => write.send(Message::text(reply)).await?,
                                LineOutcome::Reconnect => return Ok(SessionEnd::Reconnect),
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => write.send(Message::Pong(payload)).await?,
                    Some(Ok(Message::Close(_))) | None => return Ok(SessionEnd::Reconnect),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                },
                Some(line) = self.outgoing.recv() => {
                    write.send(Message::text(line)).await?;
                }
                _ = shutdown.recv() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(SessionEnd::Shutdown);
                }
            }
        }
    }

    fn handshake(&self) -> Vec<String> {
        let mut lines = vec!["CAP REQ :twitch.tv/tags twitch.tv/commands".to_string()];
        if !self.config.oauth_token.is_empty() {
            let token = self.config.oauth_token.trim_start_matches("oauth:");
            lines.push(format!("PASS oauth:{}", token));
        }
        lines.push(format!("NICK {}", self.config.username));

        let mut channels: Vec<String> = self.channels.iter().map(|c| c.key().clone()).collect();
        channels.sort();
        lines.extend(channels.iter().map(|c| irc::join(c)));
        lines
    }
}

fn handle_line(line: &str, inbound: &mpsc::UnboundedSender<ChatMessage>, bot_nick: &str) -> LineOutcome {
    let Some(message) = IrcMessage::parse(line) else {
        tracing::debug!(line = %line, "Unparseable chat line");
        return LineOutcome::Nothing;
    };

    match message.command.as_str() {
        "PING" => LineOutcome::Reply(irc::pong(message.trailing().unwrap_or("tmi.twitch.tv"))),
        "RECONNECT" => LineOutcome::Reconnect,
        "001" => {
            tracing::info!(nick = %bot_nick, "Logged in to chat");
            LineOutcome::Nothing
        }
        "NOTICE" => {
            tracing::warn!(notice = ?message.trailing(), "Chat server notice");
            LineOutcome::Nothing
        }
        "PRIVMSG" => {
            if let Some(chat_message) = to_chat_message(&message, bot_nick) {
                if inbound.send(chat_message).is_err() {
                    tracing::warn!("Dispatcher stopped, dropping chat message");
                }
            }
            LineOutcome::Nothing
        }
        _ => LineOutcome::Nothing,
    }
}

fn to_chat_message(message: &IrcMessage, bot_nick: &str) -> Option<ChatMessage> {
    let room = message.channel()?;
    let nick = message.nick()?;
    let text = message.trailing()?;
    if message.params.len() < 2 {
        return None;
    }

    Some(ChatMessage {
        room: normalize_room(room),
        tags: ChatTags::from_irc(&message.tags, nick),
        text: text.to_string(),
        is_self: nick.eq_ignore_ascii_case(bot_nick),
    })
}
