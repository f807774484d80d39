//! Per-command reply façade.

use std::fmt::Display;
use std::sync::Arc;

use crate::chat::ChatTags;
use crate::observability::metrics;
use crate::outbound::OutboundQueue;

/// Anything that can deliver a line of text to a chat room.
pub trait ReplySink: Send + Sync {
    fn say(&self, room: &str, text: &str);
}

/// Binds the reply sink, the invoking user, the room and the outbound queue
/// for one command.
#[derive(Clone)]
pub struct Responder {
    sink: Arc<dyn ReplySink>,
    tags: Arc<ChatTags>,
    room: String,
    queue: Arc<OutboundQueue>,
}

impl Responder {
    pub fn new(sink: Arc<dyn ReplySink>, tags: Arc<ChatTags>, room: impl Into<String>, queue: Arc<OutboundQueue>) -> Self {
        Self {
            sink,
            tags,
            room: room.into(),
            queue,
        }
    }

    /// Send `message` to the room as-is.
    pub fn respond(&self, message: impl Into<String>) {
        self.enqueue(message.into());
    }

    /// Send `@<display-name>, <message>` to the room.
    pub fn respond_with_mention(&self, message: impl Display) {
        self.enqueue(format!("@{}, {}", self.tags.display_name(), message));
    }

    fn enqueue(&self, text: String) {
        let sink = self.sink.clone();
        let room = self.room.clone();
        self.queue.add(move || {
            sink.say(&room, &text);
            metrics::record_reply_sent();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSink {
        lines: Mutex<Vec<(String, String)>>,
    }

    impl ReplySink for RecordingSink {
        fn say(&self, room: &str, text: &str) {
            self.lines.lock().unwrap().push((room.to_string(), text.to_string()));
        }
    }

    fn tags(display: &str) -> Arc<ChatTags> {
        Arc::new(ChatTags {
            display_name: Some(display.to_string()),
            username: display.to_lowercase(),
            ..ChatTags::default()
        })
    }

    #[test]
    fn test_respond_and_mention() {
        let sink = Arc::new(RecordingSink::default());
        let queue = Arc::new(OutboundQueue::new(5, Duration::from_secs(30)));
        let responder = Responder::new(sink.clone(), tags("Viewer"), "room", queue);

        responder.respond("Playlist cleared");
        responder.respond_with_mention("skipping...");

        let lines = sink.lines.lock().unwrap().clone();
        assert_eq!(
            lines,
            vec![
                ("room".to_string(), "Playlist cleared".to_string()),
                ("room".to_string(), "@Viewer, skipping...".to_string()),
            ]
        );
    }

    #[test]
    fn test_replies_respect_queue_capacity() {
        let sink = Arc::new(RecordingSink::default());
        let queue = Arc::new(OutboundQueue::new(1, Duration::from_secs(30)));
        let responder = Responder::new(sink.clone(), tags("Viewer"), "room", queue.clone());

        responder.respond("first");
        responder.respond("second");
        assert_eq!(sink.lines.lock().unwrap().len(), 1);
        assert_eq!(queue.pending(), 1);

        queue.tick();
        let lines = sink.lines.lock().unwrap().clone();
        assert_eq!(lines[1].1, "second");
    }
}
