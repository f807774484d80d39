//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → BotConfig (validated, immutable)
//!     → sections handed to each subsystem at startup
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the playlist defaults (ArcSwap)
//!     → add/set commands observe new limits
//! ```
//!
//! # Design Decisions
//! - Secrets come from the environment, never required in the file
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    BotConfig, ChatConfig, Environment, LookupConfig, ObservabilityConfig, PlaylistConfig,
    QueueConfig, ServerConfig,
};
pub use watcher::ConfigWatcher;
