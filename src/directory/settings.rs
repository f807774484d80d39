//! Per-room overrides of the song request rules.

use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::config::PlaylistConfig;

/// Values a room has changed with `set`. Unset fields follow the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomSettings {
    pub min_views: Option<u64>,
    pub min_duration_secs: Option<u64>,
    pub max_duration_secs: Option<u64>,
    pub stream_sync: bool,
}

/// Rules in force for one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub min_views: u64,
    pub min_duration_secs: u64,
    pub max_duration_secs: u64,
    pub max_songs_per_user: usize,
    pub max_playlist_secs: u64,
    pub stream_sync: bool,
}

/// Room overrides layered over hot-swappable defaults.
pub struct SettingsStore {
    defaults: Arc<ArcSwap<PlaylistConfig>>,
    rooms: DashMap<String, RoomSettings>,
}

impl SettingsStore {
    pub fn new(defaults: Arc<ArcSwap<PlaylistConfig>>) -> Self {
        Self {
            defaults,
            rooms: DashMap::new(),
        }
    }

    /// Handle used by the config watcher to swap defaults.
    pub fn defaults(&self) -> Arc<ArcSwap<PlaylistConfig>> {
        self.defaults.clone()
    }

    pub fn effective(&self, room: &str) -> EffectiveSettings {
        let defaults = self.defaults.load();
        let overrides = self.rooms.get(room).map(|entry| entry.value().clone()).unwrap_or_default();

        EffectiveSettings {
            min_views: overrides.min_views.unwrap_or(defaults.min_views),
            min_duration_secs: overrides.min_duration_secs.unwrap_or(defaults.min_duration_secs),
            max_duration_secs: overrides.max_duration_secs.unwrap_or(defaults.max_duration_secs),
            max_songs_per_user: defaults.max_songs_per_user,
            max_playlist_secs: defaults.max_playlist_secs,
            stream_sync: overrides.stream_sync,
        }
    }

    /// Change one room's overrides.
    pub fn update(&self, room: &str, f: impl FnOnce(&mut RoomSettings)) {
        f(&mut self.rooms.entry(room.to_string()).or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_and_hot_defaults() {
        let defaults = Arc::new(ArcSwap::from_pointee(PlaylistConfig::default()));
        let settings = SettingsStore::new(defaults.clone());

        settings.update("room", |s| s.min_views = Some(5));
        let room = settings.effective("room");
        assert_eq!(room.min_views, 5);
        assert_eq!(room.max_duration_secs, 1_200);

        defaults.store(Arc::new(PlaylistConfig {
            min_views: 1,
            max_duration_secs: 300,
            ..PlaylistConfig::default()
        }));

        // Overrides win, other fields follow the new defaults
        assert_eq!(settings.effective("room").min_views, 5);
        assert_eq!(settings.effective("room").max_duration_secs, 300);
        assert_eq!(settings.effective("other").min_views, 1);
    }
}
