//! Video metadata lookup.
//!
//! # Responsibilities
//! - Extract a video id from a link or bare id
//! - Fetch title, channel, view count and duration for an id
//!
//! # Design Decisions
//! - Commands only see the [`VideoLookup`] trait
//! - Channel thumbnails are best effort; a failed channel request still
//!   yields a usable [`VideoInfo`]

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::config::LookupConfig;
use crate::routing::BoxFuture;

/// Metadata needed to queue a song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub views: u64,
    pub duration_secs: u64,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("video {0} not found")]
    NotFound(String),

    #[error("lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unparseable duration {0}")]
    InvalidDuration(String),
}

/// Source of video metadata.
pub trait VideoLookup: Send + Sync {
    fn video<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<VideoInfo, LookupError>>;
}

/// Extract an 11-character video id from a bare id or a watch, short, embed
/// or `youtu.be` link.
pub fn parse_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if is_video_id(input) {
        return Some(input.to_string());
    }

    let url = Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{input}")))
        .ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let id = match host {
        "youtu.be" => segments.next()?.to_string(),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" => match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())?,
            "shorts" | "embed" | "live" | "v" => segments.next()?.to_string(),
            _ => return None,
        },
        _ => return None,
    };

    is_video_id(&id).then_some(id)
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Parse an ISO 8601 duration such as `PT1H2M3S` or `P1DT5M` into seconds.
pub fn parse_iso8601_duration(raw: &str) -> Option<u64> {
    let rest = raw.strip_prefix('P')?;
    let mut total = 0u64;
    let mut number = String::new();
    let mut in_time = false;
    let mut seen_unit = false;

    for c in rest.chars() {
        match c {
            '0'..='9' => number.push(c),
            'T' if !in_time && number.is_empty() => in_time = true,
            unit => {
                let value: u64 = number.parse().ok()?;
                number.clear();
                let scale = match (in_time, unit) {
                    (false, 'W') => 7 * 86_400,
                    (false, 'D') => 86_400,
                    (true, 'H') => 3_600,
                    (true, 'M') => 60,
                    (true, 'S') => 1,
                    _ => return None,
                };
                total = total.checked_add(value.checked_mul(scale)?)?;
                seen_unit = true;
            }
        }
    }

    (number.is_empty() && seen_unit).then_some(total)
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    content_details: ContentDetails,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    channel_title: String,
    channel_id: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    /// Sent as a decimal string.
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    snippet: ChannelSnippet,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

/// [`VideoLookup`] backed by the YouTube Data API.
pub struct YoutubeLookup {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl YoutubeLookup {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn fetch_video(&self, id: &str) -> Result<VideoInfo, LookupError> {
        let response: ListResponse<VideoItem> = self
            .client
            .get(format!("{}/videos", self.base_url))
            .query(&[
                ("part", "snippet,contentDetails,statistics"),
                ("id", id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound(id.to_string()))?;

        let duration_secs = parse_iso8601_duration(&item.content_details.duration)
            .ok_or_else(|| LookupError::InvalidDuration(item.content_details.duration.clone()))?;
        let views = item
            .statistics
            .view_count
            .as_deref()
            .and_then(|count| count.parse().ok())
            .unwrap_or(0);

        let thumbnail_url = match self.fetch_channel_thumbnail(&item.snippet.channel_id).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(channel_id = %item.snippet.channel_id, error = %e, "Channel lookup failed");
                None
            }
        };

        Ok(VideoInfo {
            id: item.id,
            title: item.snippet.title,
            channel_title: item.snippet.channel_title,
            views,
            duration_secs,
            thumbnail_url,
        })
    }

    async fn fetch_channel_thumbnail(&self, channel_id: &str) -> Result<Option<String>, LookupError> {
        let response: ListResponse<ChannelItem> = self
            .client
            .get(format!("{}/channels", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("id", channel_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .items
            .into_iter()
            .next()
            .and_then(|item| item.snippet.thumbnails.default)
            .map(|thumbnail| thumbnail.url))
    }
}

impl VideoLookup for YoutubeLookup {
    fn video<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<VideoInfo, LookupError>> {
        Box::pin(self.fetch_video(id))
    }
}
