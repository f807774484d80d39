//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{BotConfig, Environment};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file, apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<BotConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: BotConfig = toml::from_str(&content)?;
    finalize(config, |key| std::env::var(key).ok())
}

/// Defaults plus environment overrides, validated.
pub fn load_from_env() -> Result<BotConfig, ConfigError> {
    finalize(BotConfig::default(), |key| std::env::var(key).ok())
}

fn finalize<F>(mut config: BotConfig, env: F) -> Result<BotConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Override secrets and deployment-specific values from the environment.
pub fn apply_env_overrides<F>(config: &mut BotConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = env("BOT_ENV") {
        config.environment = if value.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        };
    }

    let overrides: [(&str, &mut String); 6] = [
        ("TWITCH_USERNAME", &mut config.chat.username),
        ("TWITCH_OAUTH", &mut config.chat.oauth_token),
        ("COMMAND_PREFIX", &mut config.chat.command_prefix),
        ("FM_OWNER_ID", &mut config.chat.owner_id),
        ("FM_OWNER_USERNAME", &mut config.chat.owner_username),
        ("GOOGLE_API_KEY", &mut config.lookup.api_key),
    ];
    for (key, field) in overrides {
        if let Some(value) = env(key).filter(|v| !v.is_empty()) {
            *field = value;
        }
    }

    if let Some(channels) = env("BOT_CHANNELS") {
        config.chat.channels = channels
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = BotConfig::default();
        apply_env_overrides(
            &mut config,
            env_of(&[
                ("BOT_ENV", "production"),
                ("TWITCH_USERNAME", "fmbot"),
                ("COMMAND_PREFIX", "sr"),
                ("FM_OWNER_ID", "1234"),
                ("BOT_CHANNELS", "one, two,,"),
                ("GOOGLE_API_KEY", ""),
            ]),
        );

        assert!(config.environment.is_production());
        assert_eq!(config.chat.username, "fmbot");
        assert_eq!(config.chat.root_command(), "!sr");
        assert_eq!(config.chat.owner_id, "1234");
        assert_eq!(config.chat.channels, vec!["one", "two"]);
        // Empty values don't clobber
        assert!(config.lookup.api_key.is_empty());
    }

    #[test]
    fn test_finalize_rejects_invalid() {
        let err = finalize(BotConfig::default(), env_of(&[("COMMAND_PREFIX", "a b")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert_eq!(
            err.to_string(),
            "Validation failed: chat.command_prefix: must be a single non-empty word"
        );
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("playlist-bot-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[queue]\nlimit_per_interval = 2\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.queue.limit_per_interval, Some(2));

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
