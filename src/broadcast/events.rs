//! Viewer wire events.
//!
//! Events are JSON objects tagged by `event`; server payloads travel under
//! `data`.

use serde::{Deserialize, Serialize};

use crate::playback::{CurrentSong, Song};

/// Events pushed to viewers of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full snapshot: now playing plus the queue.
    Song { current: CurrentSong, list: Vec<Song> },
    /// Seconds left on the current song.
    SongSync(u64),
    PlaylistAdd(Song),
    Skip(SkipEvent),
    Pause,
    Play,
    Clear,
    /// The room is not enabled for viewers.
    #[serde(rename = "no42fm")]
    No42fm,
    UserCount(usize),
}

/// Payload of [`ServerEvent::Skip`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SkipEvent {
    /// The next queued song started.
    Playlist { current: CurrentSong },
    /// The queue was empty; nothing plays now.
    #[serde(rename = "noplaylist")]
    NoPlaylist,
}

/// Events sent by viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinRoom { room: String },
    Sync { room: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_and_newtype_events() {
        assert_eq!(serde_json::to_value(ServerEvent::Pause).unwrap(), json!({"event": "pause"}));
        assert_eq!(serde_json::to_value(ServerEvent::No42fm).unwrap(), json!({"event": "no42fm"}));
        assert_eq!(
            serde_json::to_value(ServerEvent::UserCount(3)).unwrap(),
            json!({"event": "userCount", "data": 3})
        );
        assert_eq!(
            serde_json::to_value(ServerEvent::Skip(SkipEvent::NoPlaylist)).unwrap(),
            json!({"event": "skip", "data": {"type": "noplaylist"}})
        );
    }

    #[test]
    fn test_client_events() {
        let join: ClientEvent = serde_json::from_str(r#"{"event":"joinRoom","room":"Some"}"#).unwrap();
        assert_eq!(join, ClientEvent::JoinRoom { room: "Some".into() });

        let sync: ClientEvent = serde_json::from_str(r#"{"event":"sync","room":"x"}"#).unwrap();
        assert_eq!(sync, ClientEvent::Sync { room: "x".into() });

        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"leave"}"#).is_err());
    }
}
