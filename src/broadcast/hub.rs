//! Per-room fan-out of viewer events.

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::broadcast::ServerEvent;
use crate::observability::metrics;

/// Sends events to the viewers of a room.
pub trait Broadcaster: Send + Sync {
    fn emit(&self, room: &str, event: ServerEvent);

    /// Viewers currently connected to `room`.
    fn viewer_count(&self, room: &str) -> usize;

    /// Viewers across all rooms.
    fn total_viewers(&self) -> usize;
}

/// In-process broadcaster backed by one tokio broadcast channel per room.
pub struct RoomHub {
    rooms: DashMap<String, broadcast::Sender<ServerEvent>>,
    capacity: usize,
}

impl RoomHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            capacity,
        }
    }

    /// Join `room` and announce the new viewer count to it.
    pub fn subscribe(&self, room: &str) -> broadcast::Receiver<ServerEvent> {
        let rx = self
            .rooms
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();
        self.announce_count(room);
        rx
    }

    /// Leave `room`, consuming the viewer's receiver.
    pub fn unsubscribe(&self, room: &str, rx: broadcast::Receiver<ServerEvent>) {
        drop(rx);
        self.rooms.remove_if(room, |_, tx| tx.receiver_count() == 0);
        self.announce_count(room);
    }

    fn announce_count(&self, room: &str) {
        let count = self.viewer_count(room);
        metrics::record_viewers(room, count);
        self.emit(room, ServerEvent::UserCount(count));
    }
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Broadcaster for RoomHub {
    fn emit(&self, room: &str, event: ServerEvent) {
        let Some(tx) = self.rooms.get(room).map(|entry| entry.value().clone()) else {
            return;
        };
        // No receivers is fine; nobody is watching.
        let _ = tx.send(event);
    }

    fn viewer_count(&self, room: &str) -> usize {
        self.rooms
            .get(room)
            .map(|entry| entry.value().receiver_count())
            .unwrap_or(0)
    }

    fn total_viewers(&self) -> usize {
        self.rooms.iter().map(|entry| entry.value().receiver_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_counts_viewers() {
        let hub = RoomHub::default();
        let mut first = hub.subscribe("room");
        assert_eq!(first.recv().await.unwrap(), ServerEvent::UserCount(1));

        let second = hub.subscribe("room");
        assert_eq!(first.recv().await.unwrap(), ServerEvent::UserCount(2));
        assert_eq!(hub.viewer_count("room"), 2);
        assert_eq!(hub.total_viewers(), 2);

        hub.unsubscribe("room", second);
        assert_eq!(first.recv().await.unwrap(), ServerEvent::UserCount(1));
    }

    #[tokio::test]
    async fn test_emit_is_scoped_to_room() {
        let hub = RoomHub::default();
        let mut a = hub.subscribe("a");
        let mut b = hub.subscribe("b");
        a.recv().await.unwrap();
        b.recv().await.unwrap();

        hub.emit("a", ServerEvent::Clear);
        assert_eq!(a.recv().await.unwrap(), ServerEvent::Clear);
        assert!(b.try_recv().is_err());

        // Unknown rooms are ignored
        hub.emit("nobody", ServerEvent::Pause);
        assert_eq!(hub.viewer_count("nobody"), 0);
    }

    #[test]
    fn test_last_viewer_removes_room() {
        let hub = RoomHub::default();
        let rx = hub.subscribe("room");
        hub.unsubscribe("room", rx);
        assert!(hub.rooms.get("room").is_none());
    }
}
