//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, tracing layer)
//!     → GET /health → status JSON
//!     → GET /ws → websocket.rs (viewer session)
//!         → broadcast::RoomHub (room events)
//!         → playback::RoomRegistry (snapshots, sync)
//! ```

pub mod server;
pub mod websocket;

pub use server::{AppState, HttpServer};
