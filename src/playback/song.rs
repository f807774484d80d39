use serde::{Deserialize, Serialize};

/// A requested song as stored in the playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    #[serde(rename = "yt_id")]
    pub video_id: String,
    pub title: String,
    /// Uploading channel.
    pub artist: String,
    pub url: String,
    #[serde(rename = "imgUrl", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "duration")]
    pub duration_secs: u64,
    /// Login of the requester.
    #[serde(rename = "username")]
    pub requested_by: String,
}

impl Song {
    /// Short link posted back to chat.
    pub fn short_url(&self) -> String {
        format!("https://youtu.be/{}", self.video_id)
    }
}

/// The song in the now-playing slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSong {
    #[serde(flatten)]
    pub song: Song,
    pub duration_remaining: u64,
    pub is_playing: bool,
}
