//! Playback subsystem.
//!
//! # Data Flow
//! ```text
//! Song request (commands::add)
//!     → lookup.rs (video id → metadata)
//!     → registry.rs (room → PlaybackManager)
//!     → manager.rs (store.rs keys, serialized per room)
//!     → broadcast::Broadcaster (viewer events)
//!
//! scheduler.rs (every tick)
//!     → manager.advance_if_finished for each known room
//! ```
//!
//! # Design Decisions
//! - A song's end is modeled as key expiry; pausing removes the expiry
//! - Each room has its own manager and lock; rooms never block each other
//! - Errors are split into user-facing messages and internal failures

pub mod error;
pub mod lookup;
pub mod manager;
pub mod registry;
pub mod scheduler;
pub mod song;
pub mod store;

pub use error::PlaybackError;
pub use lookup::{parse_video_id, LookupError, VideoInfo, VideoLookup, YoutubeLookup};
pub use manager::{Enqueued, PlaybackManager, Skipped, VoteTally};
pub use registry::RoomRegistry;
pub use song::{CurrentSong, Song};
pub use store::{MemoryStore, StateStore, Ttl};
