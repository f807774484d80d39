//! Command middleware.
//!
//! Each function either calls [`Next::run`] to continue the chain or returns
//! without it to stop dispatch. Privilege checks stop silently; the others
//! tell the chatter why.

use crate::commands::Context;
use crate::routing::{HandlerResult, Next};

/// Only the bot owner.
pub async fn is_owner(ctx: &Context, _args: &[String], next: Next) -> HandlerResult {
    if ctx.privileges().is_owner {
        return next.run();
    }
    Ok(())
}

/// The bot owner, or anyone in the owner's own channel.
pub async fn is_owner_or_owner_room(ctx: &Context, _args: &[String], next: Next) -> HandlerResult {
    let owner_room = ctx.room.eq_ignore_ascii_case(&ctx.services.owner_username);
    if ctx.privileges().is_owner || owner_room {
        return next.run();
    }
    Ok(())
}

/// The bot owner, the channel's broadcaster or one of its moderators.
pub async fn is_owner_broadcaster_mod(ctx: &Context, _args: &[String], next: Next) -> HandlerResult {
    if ctx.privileges().is_elevated() {
        return next.run();
    }
    Ok(())
}

pub async fn check_is_paused(ctx: &Context, _args: &[String], next: Next) -> HandlerResult {
    if ctx.manager.is_paused() {
        ctx.responder.respond_with_mention("action disabled while paused");
        return Ok(());
    }
    next.run()
}

pub async fn is_banned(ctx: &Context, _args: &[String], next: Next) -> HandlerResult {
    if ctx.services.bans.is_banned(&ctx.room, &ctx.tags.username) {
        tracing::debug!(room = %ctx.room, user = %ctx.tags.username, "Ignoring banned user");
        ctx.responder.respond_with_mention("you are banned from this channel");
        return Ok(());
    }
    next.run()
}

/// Count every dispatched command against the room.
pub async fn count_usage(ctx: &Context, _args: &[String], next: Next) -> HandlerResult {
    if let Err(e) = ctx.manager.record_usage() {
        tracing::warn!(room = %ctx.room, error = %e, "Failed to count command usage");
    }
    next.run()
}
