//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, limits > 0)
//! - Validate addresses and URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BotConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::BotConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &BotConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.chat.url) {
        Ok(url) if url.scheme() == "ws" || url.scheme() == "wss" => {}
        Ok(url) => errors.push(ValidationError::new(
            "chat.url",
            format!("unsupported scheme '{}', expected ws or wss", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("chat.url", e.to_string())),
    }

    if config.chat.username.trim().is_empty() {
        errors.push(ValidationError::new("chat.username", "must not be empty"));
    }

    let prefix = &config.chat.command_prefix;
    if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
        errors.push(ValidationError::new(
            "chat.command_prefix",
            "must be a single non-empty word",
        ));
    }

    if config.chat.reconnect_base_delay_ms > config.chat.reconnect_max_delay_ms {
        errors.push(ValidationError::new(
            "chat.reconnect_base_delay_ms",
            "must not exceed chat.reconnect_max_delay_ms",
        ));
    }

    if config.queue.limit_per_interval == Some(0) {
        errors.push(ValidationError::new("queue.limit_per_interval", "must be positive"));
    }

    if config.queue.reset_interval_ms == 0 {
        errors.push(ValidationError::new("queue.reset_interval_ms", "must be positive"));
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("invalid socket address '{}'", config.server.bind_address),
        ));
    }

    let playlist = &config.playlist;
    if playlist.min_duration_secs > playlist.max_duration_secs {
        errors.push(ValidationError::new(
            "playlist.min_duration_secs",
            "must not exceed playlist.max_duration_secs",
        ));
    }

    if playlist.max_songs_per_user == 0 {
        errors.push(ValidationError::new("playlist.max_songs_per_user", "must be positive"));
    }

    if playlist.scheduler_interval_ms == 0 {
        errors.push(ValidationError::new("playlist.scheduler_interval_ms", "must be positive"));
    }

    if !config.lookup.api_key.is_empty() && Url::parse(&config.lookup.base_url).is_err() {
        errors.push(ValidationError::new("lookup.base_url", "invalid URL"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&BotConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = BotConfig::default();
        config.chat.url = "https://example.com".into();
        config.chat.command_prefix = "two words".into();
        config.queue.limit_per_interval = Some(0);
        config.queue.reset_interval_ms = 0;
        config.playlist.min_duration_secs = 600;
        config.playlist.max_duration_secs = 60;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();

        assert_eq!(
            fields,
            vec![
                "chat.url",
                "chat.command_prefix",
                "queue.limit_per_interval",
                "queue.reset_interval_ms",
                "playlist.min_duration_secs",
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = BotConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
