//! Handlers for `!fm <command>`.

use rand::seq::SliceRandom;

use crate::commands::add::request_video;
use crate::commands::Context;
use crate::playback::Skipped;
use crate::routing::{HandlerResult, Next};

pub async fn handle_ping(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    ctx.responder.respond("Pong imGlitch 👍");
    Ok(())
}

pub async fn handle_uptime(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    let elapsed = ctx.services.started_at.elapsed().as_secs();
    ctx.responder.respond(format!(
        "Uptime: {}h {}m {}s MrDestructoid",
        elapsed / 3_600,
        elapsed / 60 % 60,
        elapsed % 60
    ));
    Ok(())
}

pub async fn handle_channels(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    let channels = ctx.services.chat.channels();
    ctx.responder.respond(format!("Connected channels: {}", channels.join(", ")));
    Ok(())
}

/// Queue a song picked from `playlist.random_songs`.
pub async fn handle_random(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    let picked = {
        let defaults = ctx.services.settings.defaults().load();
        defaults.random_songs.choose(&mut rand::thread_rng()).cloned()
    };

    match picked {
        Some(song) => request_video(ctx, &song).await,
        None => ctx.responder.respond_with_mention("no random songs configured"),
    }
    Ok(())
}

/// Queue the configured timer video.
pub async fn handle_timer(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    let id = ctx.services.settings.defaults().load().timer_video_id.clone();
    if id.is_empty() {
        ctx.responder.respond_with_mention("no timer video configured");
        return Ok(());
    }
    request_video(ctx, &id).await;
    Ok(())
}

pub async fn handle_connections(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    ctx.responder.respond_with_mention("available commands: irc, ws");
    Ok(())
}

pub async fn handle_help(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    let command = &ctx.services.command;
    ctx.responder.respond_with_mention(format!(
        "available commands: {command} <link/id>, {command} song, {command} wrong, {command} voteskip"
    ));
    Ok(())
}

pub async fn handle_search(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    ctx.responder
        .respond_with_mention(format!("use {} <link/id> to add a song", ctx.services.command));
    Ok(())
}

pub async fn handle_song(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    match ctx.manager.current() {
        Ok(Some(current)) => ctx
            .responder
            .respond_with_mention(format!("Current song: {}", current.song.short_url())),
        Ok(None) => ctx.responder.respond_with_mention("Nothing is playing"),
        Err(e) => ctx.report(e, "could not get current song"),
    }
    Ok(())
}

pub async fn handle_wrong(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    if ctx.manager.is_paused() {
        ctx.responder.respond_with_mention("Cannot delete wrong song while paused");
        return Ok(());
    }

    match ctx.manager.playlist() {
        Ok(playlist) if playlist.is_empty() => {
            ctx.responder.respond_with_mention("playlist empty");
            return Ok(());
        }
        Ok(_) => {}
        Err(e) => {
            ctx.report(e, "could not remove your song");
            return Ok(());
        }
    }

    match ctx.manager.remove_last_by(&ctx.tags.username) {
        Ok(Some(_)) => ctx.responder.respond_with_mention("removed your last song"),
        Ok(None) => ctx
            .responder
            .respond_with_mention("could not find your last added song"),
        Err(e) => ctx.report(e, "could not remove your song"),
    }
    Ok(())
}

pub async fn handle_clear(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    ctx.manager.clear();
    ctx.responder.respond("Playlist cleared");
    Ok(())
}

pub async fn handle_disconnect(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    ctx.responder.respond_with_mention("disconnecting... :(");
    ctx.services.chat.part(&ctx.room);
    Ok(())
}

pub async fn handle_skip(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    match ctx.manager.skip() {
        Ok(Skipped::Next(_)) | Ok(Skipped::Stopped) => ctx.responder.respond_with_mention("skipping..."),
        Err(e) => ctx.report(e, "could not skip song"),
    }
    Ok(())
}

pub async fn handle_play(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    match ctx.manager.play() {
        Ok(()) => ctx.responder.respond_with_mention("Playing"),
        Err(e) => ctx.report(e, "Error while playing"),
    }
    Ok(())
}

pub async fn handle_pause(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    match ctx.manager.pause() {
        Ok(()) => ctx.responder.respond_with_mention("Paused"),
        Err(e) => ctx.report(e, "Error while pausing"),
    }
    Ok(())
}

pub async fn handle_voteskip(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    let viewers = ctx.services.broadcaster.viewer_count(&ctx.room);
    match ctx.manager.vote_skip(&ctx.tags.username, viewers) {
        Ok(tally) if tally.skipped => ctx
            .responder
            .respond(format!("{}/{} votes, skipping...", tally.votes, tally.threshold)),
        Ok(tally) => ctx
            .responder
            .respond(format!("{}/{} votes", tally.votes, tally.threshold)),
        Err(e) => ctx.report(e, "could not count your vote"),
    }
    Ok(())
}

pub async fn handle_ban(ctx: &Context, args: &[String], _next: Next) -> HandlerResult {
    let Some(user) = args.first() else {
        ctx.responder.respond_with_mention("please specify a user");
        return Ok(());
    };

    if ctx.services.bans.ban(&ctx.room, user) {
        tracing::info!(room = %ctx.room, user = %user, "User banned");
        ctx.responder.respond_with_mention("user has been banned");
    } else {
        ctx.responder.respond_with_mention("user has already been banned");
    }
    Ok(())
}

pub async fn handle_unban(ctx: &Context, args: &[String], _next: Next) -> HandlerResult {
    let Some(user) = args.first() else {
        ctx.responder.respond_with_mention("please specify a user");
        return Ok(());
    };

    if ctx.services.bans.unban(&ctx.room, user) {
        tracing::info!(room = %ctx.room, user = %user, "User unbanned");
        ctx.responder.respond_with_mention("User has been unbanned");
    } else {
        ctx.responder.respond_with_mention("User is not banned");
    }
    Ok(())
}
