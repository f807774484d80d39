//! `!fm <link|id>`: request a song.
//!
//! # Rules
//! - Paused rooms take no requests
//! - Everyone: at most `max_songs_per_user` queued songs each, no adds once
//!   the queue is longer than `max_playlist_secs`, no duplicates
//! - Regular chatters additionally need `min_views` and a length within
//!   `min_duration_secs..=max_duration_secs` (room settings over defaults)

use crate::commands::Context;
use crate::directory::EffectiveSettings;
use crate::playback::{parse_video_id, Enqueued, LookupError, Song, VideoInfo};
use crate::routing::{HandlerResult, Next};

pub async fn handle_command(ctx: &Context, args: &[String], _next: Next) -> HandlerResult {
    let command = &ctx.services.command;
    let Some(input) = args.first() else {
        ctx.responder
            .respond_with_mention(format!("Use {command} <link/id> to add a song"));
        return Ok(());
    };
    if args.concat().chars().count() <= 3 {
        ctx.responder
            .respond_with_mention(format!("Use {command} <link/id> to add a song"));
        return Ok(());
    }

    if ctx.manager.is_paused() {
        ctx.responder.respond_with_mention("Cannot add song while paused");
        return Ok(());
    }

    request_video(ctx, input).await;
    Ok(())
}

/// Check the request rules for `input`, look it up and queue it.
///
/// Replies to the chatter with the outcome. Shared by the root command and
/// the owner's `random` and `timer` commands.
pub(crate) async fn request_video(ctx: &Context, input: &str) {
    let settings = ctx.services.settings.effective(&ctx.room);
    let playlist = match ctx.manager.playlist() {
        Ok(playlist) => playlist,
        Err(e) => {
            ctx.report(e, "could not add song");
            return;
        }
    };

    let by_user = playlist
        .iter()
        .filter(|song| song.requested_by == ctx.tags.username)
        .count();
    if by_user >= settings.max_songs_per_user {
        ctx.responder
            .respond_with_mention("you have reached the maximum amount of songs in queue");
        return;
    }

    let total_secs: u64 = playlist.iter().map(|song| song.duration_secs).sum();
    if total_secs > settings.max_playlist_secs {
        ctx.responder.respond_with_mention("playlist is full");
        return;
    }

    let Some(id) = parse_video_id(input) else {
        ctx.responder.respond_with_mention("unable to find video");
        return;
    };

    if playlist.iter().any(|song| song.video_id == id) {
        ctx.responder.respond_with_mention("song already added");
        return;
    }

    let Some(lookup) = &ctx.services.lookup else {
        ctx.responder.respond_with_mention("song requests are unavailable");
        return;
    };

    let info = match lookup.video(&id).await {
        Ok(info) => info,
        Err(LookupError::NotFound(_)) => {
            ctx.responder.respond_with_mention("unable to find video");
            return;
        }
        Err(e) => {
            tracing::error!(room = %ctx.room, video_id = %id, error = %e, "Video lookup failed");
            ctx.responder.respond_with_mention("could not add song");
            return;
        }
    };

    if !ctx.privileges().is_elevated() {
        if let Some(reason) = rejection(&info, &settings) {
            tracing::info!(room = %ctx.room, video_id = %id, reason = %reason, "Song rejected");
            ctx.responder.respond_with_mention(reason);
            return;
        }
    }

    let song = Song {
        url: format!("https://youtube.com/watch?v={}", info.id),
        video_id: info.id,
        title: info.title,
        artist: info.channel_title,
        thumbnail_url: info.thumbnail_url,
        duration_secs: info.duration_secs,
        requested_by: ctx.tags.username.clone(),
    };
    let link = song.short_url();

    match ctx.manager.enqueue(song) {
        Ok(Enqueued::Started) => ctx.responder.respond_with_mention(format!("added {link}")),
        Ok(Enqueued::Queued { position }) => ctx
            .responder
            .respond_with_mention(format!("added {link} (#{position} in queue)")),
        Err(e) => ctx.report(e, "could not add song"),
    }
}

fn rejection(info: &VideoInfo, settings: &EffectiveSettings) -> Option<String> {
    if info.views < settings.min_views {
        return Some(format!("song must have at least {} views", settings.min_views));
    }
    if info.duration_secs < settings.min_duration_secs {
        return Some("song too short".to_string());
    }
    if info.duration_secs > settings.max_duration_secs {
        return Some("song too long".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlaylistConfig;
    use crate::directory::SettingsStore;
    use arc_swap::ArcSwap;
    use std::sync::Arc;

    fn info(views: u64, duration_secs: u64) -> VideoInfo {
        VideoInfo {
            id: "dQw4w9WgXcQ".into(),
            title: "t".into(),
            channel_title: "c".into(),
            views,
            duration_secs,
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_rejection_rules() {
        let settings = SettingsStore::new(Arc::new(ArcSwap::from_pointee(PlaylistConfig::default())))
            .effective("room");

        assert_eq!(rejection(&info(50_000, 200), &settings), None);
        assert_eq!(
            rejection(&info(10, 200), &settings).as_deref(),
            Some("song must have at least 10000 views")
        );
        assert_eq!(rejection(&info(50_000, 30), &settings).as_deref(), Some("song too short"));
        assert_eq!(rejection(&info(50_000, 3_000), &settings).as_deref(), Some("song too long"));
    }
}
