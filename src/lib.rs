//! Chat song-request bot library.
//!
//! A chat bot that takes song requests in stream chat, keeps one playlist
//! per channel and pushes playback state to viewer pages over WebSocket.

// Chat side
pub mod chat;
pub mod commands;
pub mod outbound;
pub mod routing;

// Playlist state
pub mod directory;
pub mod playback;

// Viewer side
pub mod broadcast;
pub mod http;

// Cross-cutting
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::BotConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
