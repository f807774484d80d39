use std::sync::Arc;

use dashmap::DashMap;

use crate::broadcast::Broadcaster;
use crate::playback::{PlaybackManager, StateStore};

/// One [`PlaybackManager`] per room, created on first use.
pub struct RoomRegistry {
    store: Arc<dyn StateStore>,
    broadcaster: Arc<dyn Broadcaster>,
    managers: DashMap<String, Arc<PlaybackManager>>,
}

impl RoomRegistry {
    pub fn new(store: Arc<dyn StateStore>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            store,
            broadcaster,
            managers: DashMap::new(),
        }
    }

    pub fn get_or_create(&self, room: &str) -> Arc<PlaybackManager> {
        self.managers
            .entry(room.to_string())
            .or_insert_with(|| {
                tracing::debug!(room = %room, "Creating playback manager");
                Arc::new(PlaybackManager::new(room, self.store.clone(), self.broadcaster.clone()))
            })
            .clone()
    }

    /// Existing manager for `room`; never creates one.
    pub fn get(&self, room: &str) -> Option<Arc<PlaybackManager>> {
        self.managers.get(room).map(|entry| entry.value().clone())
    }

    /// Managers created so far.
    pub fn managers(&self) -> Vec<Arc<PlaybackManager>> {
        self.managers.iter().map(|entry| entry.value().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::RoomHub;
    use crate::playback::MemoryStore;

    #[test]
    fn test_get_or_create_reuses_manager() {
        let registry = RoomRegistry::new(Arc::new(MemoryStore::new()), Arc::new(RoomHub::default()));
        let a = registry.get_or_create("room");
        let b = registry.get_or_create("room");
        registry.get_or_create("other");

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.managers().len(), 2);
    }

    #[test]
    fn test_get_does_not_create() {
        let registry = RoomRegistry::new(Arc::new(MemoryStore::new()), Arc::new(RoomHub::default()));
        assert!(registry.get("room").is_none());
        assert!(registry.managers().is_empty());

        let created = registry.get_or_create("room");
        assert!(Arc::ptr_eq(&registry.get("room").unwrap(), &created));
    }
}
