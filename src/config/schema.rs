//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bot.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the bot.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BotConfig {
    /// Deployment environment; selects production defaults.
    pub environment: Environment,

    /// Chat connection settings.
    pub chat: ChatConfig,

    /// Outbound reply rate limit.
    pub queue: QueueConfig,

    /// Viewer-facing HTTP/WebSocket server.
    pub server: ServerConfig,

    /// Default song request rules (rooms may override some of them).
    pub playlist: PlaylistConfig,

    /// Video metadata lookup.
    pub lookup: LookupConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Chat connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatConfig {
    /// IRC-over-WebSocket endpoint.
    pub url: String,

    /// Bot account login.
    pub username: String,

    /// OAuth token (with or without the `oauth:` prefix).
    pub oauth_token: String,

    /// Command word; the root command is `!<command_prefix>`.
    pub command_prefix: String,

    /// User id of the bot owner (owner-only commands).
    pub owner_id: String,

    /// Login of the bot owner (the owner's own room unlocks `ping`).
    pub owner_username: String,

    /// Channels joined at startup.
    pub channels: Vec<String>,

    /// Base delay for reconnect backoff in milliseconds.
    pub reconnect_base_delay_ms: u64,

    /// Maximum reconnect delay in milliseconds.
    pub reconnect_max_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            url: "wss://irc-ws.chat.twitch.tv:443".to_string(),
            username: "justinfan12345".to_string(),
            oauth_token: String::new(),
            command_prefix: "fm".to_string(),
            owner_id: String::new(),
            owner_username: String::new(),
            channels: Vec::new(),
            reconnect_base_delay_ms: 500,
            reconnect_max_delay_ms: 30_000,
        }
    }
}

impl ChatConfig {
    /// Root command segment, e.g. `!fm`.
    pub fn root_command(&self) -> String {
        format!("!{}", self.command_prefix)
    }
}

/// Outbound reply rate limit.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Replies allowed per interval. Unset picks the environment default.
    pub limit_per_interval: Option<usize>,

    /// Interval after which capacity is restored, in milliseconds.
    pub reset_interval_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            limit_per_interval: None,
            reset_interval_ms: 30_000,
        }
    }
}

impl QueueConfig {
    pub const PRODUCTION_LIMIT: usize = 20;
    pub const DEVELOPMENT_LIMIT: usize = 5;

    pub fn effective_limit(&self, environment: Environment) -> usize {
        self.limit_per_interval.unwrap_or(if environment.is_production() {
            Self::PRODUCTION_LIMIT
        } else {
            Self::DEVELOPMENT_LIMIT
        })
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Song request rules.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// Minimum view count for requests from regular users.
    pub min_views: u64,

    /// Minimum song length in seconds.
    pub min_duration_secs: u64,

    /// Maximum song length in seconds.
    pub max_duration_secs: u64,

    /// Songs one user may have queued at once.
    pub max_songs_per_user: usize,

    /// Total queued duration after which the playlist is full, in seconds.
    pub max_playlist_secs: u64,

    /// Playback scheduler tick in milliseconds.
    pub scheduler_interval_ms: u64,

    /// Links or ids picked from by the owner's `random` command.
    pub random_songs: Vec<String>,

    /// Video queued by the owner's `timer` command.
    pub timer_video_id: String,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            min_views: 10_000,
            min_duration_secs: 60,
            max_duration_secs: 1_200,
            max_songs_per_user: 5,
            max_playlist_secs: 2 * 60 * 60,
            scheduler_interval_ms: 1_000,
            random_songs: Vec::new(),
            timer_video_id: "bj1JRuyYeco".to_string(),
        }
    }
}

/// Video metadata lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Data API key; song requests are disabled when empty.
    pub api_key: String,

    /// API base URL.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_limit_by_environment() {
        let queue = QueueConfig::default();
        assert_eq!(queue.effective_limit(Environment::Production), 20);
        assert_eq!(queue.effective_limit(Environment::Development), 5);

        let explicit = QueueConfig {
            limit_per_interval: Some(7),
            ..QueueConfig::default()
        };
        assert_eq!(explicit.effective_limit(Environment::Production), 7);
    }

    #[test]
    fn test_partial_toml() {
        let config: BotConfig = toml::from_str(
            r#"
            environment = "production"

            [chat]
            command_prefix = "sr"
            channels = ["one", "two"]

            [queue]
            limit_per_interval = 3
            "#,
        )
        .unwrap();

        assert!(config.environment.is_production());
        assert_eq!(config.chat.root_command(), "!sr");
        assert_eq!(config.chat.channels.len(), 2);
        assert_eq!(config.queue.limit_per_interval, Some(3));
        assert_eq!(config.queue.reset_interval_ms, 30_000);
        assert_eq!(config.playlist, PlaylistConfig::default());
    }

    #[test]
    fn test_owner_song_lists() {
        let config: BotConfig = toml::from_str(
            r#"
            [playlist]
            random_songs = ["https://youtu.be/dQw4w9WgXcQ", "9bZkp7q19f0"]
            "#,
        )
        .unwrap();

        assert_eq!(config.playlist.random_songs.len(), 2);
        assert_eq!(config.playlist.timer_video_id, "bj1JRuyYeco");
    }
}
