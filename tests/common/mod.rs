//! Shared fakes and a dispatch harness for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;

use playlist_bot::broadcast::{Broadcaster, RoomHub};
use playlist_bot::chat::{ChatControl, ChatMessage, ChatTags};
use playlist_bot::commands::{build_router, Dispatcher, Services};
use playlist_bot::config::PlaylistConfig;
use playlist_bot::directory::{BanList, ChannelDirectory, SettingsStore};
use playlist_bot::outbound::{OutboundQueue, ReplySink};
use playlist_bot::playback::{
    LookupError, MemoryStore, RoomRegistry, Song, StateStore, VideoInfo, VideoLookup,
};
use playlist_bot::routing::BoxFuture;

pub const OWNER_ID: &str = "1000";
pub const OWNER_USERNAME: &str = "owner";

/// Captures every line the bot says.
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<(String, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Text of every reply, in order.
    pub fn texts(&self) -> Vec<String> {
        self.lines().into_iter().map(|(_, text)| text).collect()
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }
}

impl ReplySink for RecordingSink {
    fn say(&self, room: &str, text: &str) {
        self.lines.lock().unwrap().push((room.to_string(), text.to_string()));
    }
}

/// Channel membership without a network connection.
#[derive(Default)]
pub struct FakeChat {
    channels: Mutex<Vec<String>>,
}

impl ChatControl for FakeChat {
    fn join(&self, room: &str) {
        let mut channels = self.channels.lock().unwrap();
        if !channels.iter().any(|c| c == room) {
            channels.push(room.to_string());
            channels.sort();
        }
    }

    fn part(&self, room: &str) {
        self.channels.lock().unwrap().retain(|c| c != room);
    }

    fn channels(&self) -> Vec<String> {
        self.channels.lock().unwrap().clone()
    }
}

/// Serves metadata from a fixed table.
#[derive(Default)]
pub struct FakeLookup {
    videos: HashMap<String, VideoInfo>,
}

impl FakeLookup {
    pub fn with(mut self, id: &str, views: u64, duration_secs: u64) -> Self {
        self.videos.insert(
            id.to_string(),
            VideoInfo {
                id: id.to_string(),
                title: format!("title {id}"),
                channel_title: format!("artist {id}"),
                views,
                duration_secs,
                thumbnail_url: None,
            },
        );
        self
    }
}

impl VideoLookup for FakeLookup {
    fn video<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<VideoInfo, LookupError>> {
        Box::pin(async move {
            self.videos
                .get(id)
                .cloned()
                .ok_or_else(|| LookupError::NotFound(id.to_string()))
        })
    }
}

/// Dispatcher wired to in-memory fakes.
pub struct Harness {
    pub dispatcher: Dispatcher,
    pub services: Arc<Services>,
    pub sink: Arc<RecordingSink>,
    pub chat: Arc<FakeChat>,
    pub hub: Arc<RoomHub>,
}

impl Harness {
    pub fn new(lookup: FakeLookup) -> Self {
        let hub = Arc::new(RoomHub::default());
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let chat = Arc::new(FakeChat::default());
        let sink = Arc::new(RecordingSink::default());
        let defaults = Arc::new(ArcSwap::from_pointee(PlaylistConfig::default()));

        let services = Arc::new(Services {
            rooms: Arc::new(RoomRegistry::new(store, hub.clone())),
            directory: Arc::new(ChannelDirectory::new()),
            bans: Arc::new(BanList::new()),
            settings: Arc::new(SettingsStore::new(defaults)),
            lookup: Some(Arc::new(lookup)),
            broadcaster: hub.clone() as Arc<dyn Broadcaster>,
            chat: chat.clone() as Arc<dyn ChatControl>,
            owner_id: OWNER_ID.to_string(),
            owner_username: OWNER_USERNAME.to_string(),
            command: "!fm".to_string(),
            started_at: Instant::now(),
        });

        let router = build_router("!fm").unwrap();
        let queue = Arc::new(OutboundQueue::new(100, Duration::from_secs(30)));
        let dispatcher = Dispatcher::new(router, services.clone(), queue, sink.clone());

        Self {
            dispatcher,
            services,
            sink,
            chat,
            hub,
        }
    }

    /// Dispatch `text` from `tags` in `room` and wait for the chain to finish.
    pub async fn say(&self, room: &str, tags: ChatTags, text: &str) {
        let message = ChatMessage {
            room: room.to_string(),
            tags,
            text: text.to_string(),
            is_self: false,
        };
        if let Some(handle) = self.dispatcher.dispatch(message) {
            handle.await.unwrap();
        }
    }

    pub fn replies(&self) -> Vec<String> {
        self.sink.texts()
    }
}

pub fn viewer(name: &str) -> ChatTags {
    ChatTags {
        display_name: Some(name.to_string()),
        username: name.to_lowercase(),
        user_id: Some(format!("id-{}", name.to_lowercase())),
        ..ChatTags::default()
    }
}

pub fn moderator(name: &str) -> ChatTags {
    ChatTags {
        is_mod: true,
        ..viewer(name)
    }
}

pub fn owner() -> ChatTags {
    ChatTags {
        user_id: Some(OWNER_ID.to_string()),
        ..viewer(OWNER_USERNAME)
    }
}

pub fn song(id: &str, requested_by: &str, duration_secs: u64) -> Song {
    Song {
        video_id: id.to_string(),
        title: format!("title {id}"),
        artist: format!("artist {id}"),
        url: format!("https://youtube.com/watch?v={id}"),
        thumbnail_url: None,
        duration_secs,
        requested_by: requested_by.to_string(),
    }
}
