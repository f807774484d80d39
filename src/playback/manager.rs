//! Now-playing and playlist state of one room.
//!
//! # Keys
//! - `{room}:current` song JSON, expiring when the song ends (no expiry while paused)
//! - `{room}:playlist` queued song JSON, oldest first
//! - `{room}:remaining` seconds left on a paused song
//! - `{room}:votes` users who voted to skip the current song
//! - `count:{room}` dispatched command counter

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::broadcast::{Broadcaster, ServerEvent, SkipEvent};
use crate::playback::store::{StateStore, Ttl};
use crate::playback::{CurrentSong, PlaybackError, Song};

/// Where an enqueued song ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enqueued {
    /// Nothing was playing; the song started immediately.
    Started,
    /// Appended to the playlist at this 1-based position.
    Queued { position: usize },
}

/// Result of a skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skipped {
    /// The next queued song started.
    Next(Song),
    /// The playlist was empty; nothing plays now.
    Stopped,
}

/// Tally after a vote to skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    pub votes: usize,
    pub threshold: usize,
    pub skipped: bool,
}

/// Votes needed to skip with `viewers` connected.
pub fn vote_threshold(viewers: usize) -> usize {
    viewers.div_ceil(10).max(1)
}

/// Serializes state changes for one room and broadcasts them to its viewers.
pub struct PlaybackManager {
    room: String,
    store: Arc<dyn StateStore>,
    broadcaster: Arc<dyn Broadcaster>,
    lock: Mutex<()>,
}

impl PlaybackManager {
    pub fn new(room: impl Into<String>, store: Arc<dyn StateStore>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            room: room.into(),
            store,
            broadcaster,
            lock: Mutex::new(()),
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}:{}", self.room, suffix)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().expect("playback manager mutex poisoned")
    }

    fn emit(&self, event: ServerEvent) {
        self.broadcaster.emit(&self.room, event);
    }

    pub fn current(&self) -> Result<Option<CurrentSong>, PlaybackError> {
        let _guard = self.guard();
        self.current_locked()
    }

    fn current_locked(&self) -> Result<Option<CurrentSong>, PlaybackError> {
        let Some(raw) = self.store.get(&self.key("current"))? else {
            return Ok(None);
        };
        let song: Song = serde_json::from_str(&raw)?;

        let current = match self.store.ttl(&self.key("current")) {
            Ttl::Expires(left) => CurrentSong {
                duration_remaining: left.as_secs(),
                is_playing: true,
                song,
            },
            _ => CurrentSong {
                duration_remaining: self.paused_remaining()?.unwrap_or(song.duration_secs),
                is_playing: false,
                song,
            },
        };
        Ok(Some(current))
    }

    fn paused_remaining(&self) -> Result<Option<u64>, PlaybackError> {
        Ok(self
            .store
            .get(&self.key("remaining"))?
            .and_then(|raw| raw.parse().ok()))
    }

    pub fn playlist(&self) -> Result<Vec<Song>, PlaybackError> {
        let _guard = self.guard();
        self.playlist_locked()
    }

    fn playlist_locked(&self) -> Result<Vec<Song>, PlaybackError> {
        self.store
            .lrange(&self.key("playlist"))?
            .iter()
            .map(|raw| serde_json::from_str(raw).map_err(PlaybackError::from))
            .collect()
    }

    /// A song is loaded but its clock is stopped.
    pub fn is_paused(&self) -> bool {
        self.store.ttl(&self.key("current")) == Ttl::Persistent
    }

    /// Seconds left on a playing song, if any.
    pub fn remaining_secs(&self) -> Option<u64> {
        match self.store.ttl(&self.key("current")) {
            Ttl::Expires(left) if left.as_secs() > 0 => Some(left.as_secs()),
            _ => None,
        }
    }

    /// Current song and queue, when something is loaded.
    pub fn snapshot(&self) -> Result<Option<(CurrentSong, Vec<Song>)>, PlaybackError> {
        let _guard = self.guard();
        match self.current_locked()? {
            Some(current) => Ok(Some((current, self.playlist_locked()?))),
            None => Ok(None),
        }
    }

    /// Play `song` now if the room is idle, otherwise append it.
    pub fn enqueue(&self, song: Song) -> Result<Enqueued, PlaybackError> {
        let _guard = self.guard();
        let loaded = self.store.get(&self.key("current"))?.is_some();
        let queued = self.playlist_locked()?;

        if !loaded && queued.is_empty() {
            let current = self.start_locked(song)?;
            self.emit(ServerEvent::Song {
                current,
                list: Vec::new(),
            });
            return Ok(Enqueued::Started);
        }

        let position = self
            .store
            .rpush(&self.key("playlist"), serde_json::to_string(&song)?)?;
        self.emit(ServerEvent::PlaylistAdd(song));
        Ok(Enqueued::Queued { position })
    }

    fn start_locked(&self, song: Song) -> Result<CurrentSong, PlaybackError> {
        self.store.del(&self.key("remaining"));
        self.store.del(&self.key("votes"));
        self.store.set_ex(
            &self.key("current"),
            serde_json::to_string(&song)?,
            Duration::from_secs(song.duration_secs.max(1)),
        );
        Ok(CurrentSong {
            duration_remaining: song.duration_secs,
            is_playing: true,
            song,
        })
    }

    /// Move to the next queued song, or stop when the queue is empty.
    pub fn skip(&self) -> Result<Skipped, PlaybackError> {
        let _guard = self.guard();
        self.skip_locked()
    }

    fn skip_locked(&self) -> Result<Skipped, PlaybackError> {
        if self.store.get(&self.key("current"))?.is_none() {
            return Err(PlaybackError::user("Nothing to skip"));
        }

        match self.store.lpop(&self.key("playlist"))? {
            Some(raw) => {
                let song: Song = serde_json::from_str(&raw)?;
                let current = self.start_locked(song.clone())?;
                self.emit(ServerEvent::Skip(SkipEvent::Playlist { current }));
                Ok(Skipped::Next(song))
            }
            None => {
                self.store.del(&self.key("current"));
                self.store.del(&self.key("remaining"));
                self.store.del(&self.key("votes"));
                self.emit(ServerEvent::Skip(SkipEvent::NoPlaylist));
                Ok(Skipped::Stopped)
            }
        }
    }

    /// Stop the clock on the current song.
    pub fn pause(&self) -> Result<(), PlaybackError> {
        let _guard = self.guard();
        let current = self.key("current");
        match self.store.ttl(&current) {
            Ttl::Missing => Err(PlaybackError::user("Nothing to pause")),
            Ttl::Persistent => Err(PlaybackError::user("Song already paused")),
            Ttl::Expires(left) => {
                self.store.persist(&current);
                self.store.set(&self.key("remaining"), left.as_secs().to_string());
                self.emit(ServerEvent::Pause);
                Ok(())
            }
        }
    }

    /// Restart the clock on a paused song.
    pub fn play(&self) -> Result<(), PlaybackError> {
        let _guard = self.guard();
        let current = self.key("current");
        match self.store.ttl(&current) {
            Ttl::Missing => Err(PlaybackError::user("Nothing to play")),
            Ttl::Expires(_) => Err(PlaybackError::user("Song already playing")),
            Ttl::Persistent => {
                let remaining = match self.paused_remaining()? {
                    Some(secs) => secs,
                    None => self
                        .current_locked()?
                        .map(|current| current.song.duration_secs)
                        .unwrap_or(0),
                };
                self.store.expire(&current, Duration::from_secs(remaining.max(1)));
                self.store.del(&self.key("remaining"));
                self.emit(ServerEvent::Play);
                Ok(())
            }
        }
    }

    /// Drop the current song and the whole playlist.
    pub fn clear(&self) {
        let _guard = self.guard();
        for suffix in ["current", "playlist", "remaining", "votes"] {
            self.store.del(&self.key(suffix));
        }
        self.emit(ServerEvent::Clear);
    }

    /// Remove the most recent song `username` queued.
    pub fn remove_last_by(&self, username: &str) -> Result<Option<Song>, PlaybackError> {
        let _guard = self.guard();
        let raw = self.store.lrange(&self.key("playlist"))?;

        for entry in raw.iter().rev() {
            let song: Song = serde_json::from_str(entry)?;
            if song.requested_by == username {
                self.store.lrem_last(&self.key("playlist"), entry)?;
                return Ok(Some(song));
            }
        }
        Ok(None)
    }

    /// Start the next queued song once the current one has finished.
    pub fn advance_if_finished(&self) -> Result<Option<Song>, PlaybackError> {
        let _guard = self.guard();
        if self.store.get(&self.key("current"))?.is_some() {
            return Ok(None);
        }
        let Some(raw) = self.store.lpop(&self.key("playlist"))? else {
            return Ok(None);
        };

        let song: Song = serde_json::from_str(&raw)?;
        let current = self.start_locked(song.clone())?;
        let list = self.playlist_locked()?;
        tracing::info!(room = %self.room, video_id = %song.video_id, "Advancing to next song");
        self.emit(ServerEvent::Song { current, list });
        Ok(Some(song))
    }

    /// Record `username`'s vote and skip once enough viewers agree.
    pub fn vote_skip(&self, username: &str, viewers: usize) -> Result<VoteTally, PlaybackError> {
        let _guard = self.guard();
        if self.store.get(&self.key("current"))?.is_none() {
            return Err(PlaybackError::user("nothing to skip"));
        }

        let votes_key = self.key("votes");
        self.store.sadd(&votes_key, username.to_string())?;
        let votes = self.store.scard(&votes_key)?;
        let threshold = vote_threshold(viewers);

        let skipped = votes >= threshold;
        if skipped {
            self.store.del(&votes_key);
            self.skip_locked()?;
        }
        Ok(VoteTally {
            votes,
            threshold,
            skipped,
        })
    }

    /// Count a dispatched command against this room.
    pub fn record_usage(&self) -> Result<i64, PlaybackError> {
        Ok(self.store.incr(&format!("count:{}", self.room))?)
    }
}
