//! Channel directory subsystem.
//!
//! In-memory records of which channels the bot serves, who is banned in
//! each, and the song request rules each room has changed.

pub mod bans;
pub mod channels;
pub mod settings;

pub use bans::BanList;
pub use channels::{ChannelChange, ChannelDirectory};
pub use settings::{EffectiveSettings, RoomSettings, SettingsStore};
