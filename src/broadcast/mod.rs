//! Viewer broadcast subsystem.
//!
//! # Data Flow
//! ```text
//! playback::PlaybackManager (state change)
//!     → Broadcaster::emit(room, ServerEvent)
//!     → RoomHub (one tokio broadcast channel per room)
//!     → http::websocket (serialize to JSON, write to each viewer)
//! ```
//!
//! # Design Decisions
//! - Rooms are created on first subscribe and dropped with their last viewer
//! - Slow viewers lag and skip events rather than block emitters

pub mod events;
pub mod hub;

pub use events::{ClientEvent, ServerEvent, SkipEvent};
pub use hub::{Broadcaster, RoomHub};
