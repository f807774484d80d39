//! Handlers for `!fm channels <add|enable|disable> <name>`.

use crate::chat::client::normalize_room;
use crate::commands::Context;
use crate::directory::ChannelChange;
use crate::routing::{HandlerResult, Next};

fn channel_arg(ctx: &Context, args: &[String]) -> Option<String> {
    match args.first() {
        Some(name) => Some(normalize_room(name)),
        None => {
            ctx.responder.respond_with_mention("no channel provided");
            None
        }
    }
}

pub async fn handle_add(ctx: &Context, args: &[String], _next: Next) -> HandlerResult {
    let Some(name) = channel_arg(ctx, args) else {
        return Ok(());
    };

    match ctx.services.directory.add(&name) {
        ChannelChange::Applied => {
            tracing::info!(channel = %name, "Channel added");
            ctx.responder.respond_with_mention("channel added");
        }
        _ => ctx.responder.respond_with_mention("channel already added"),
    }
    Ok(())
}

pub async fn handle_enable(ctx: &Context, args: &[String], _next: Next) -> HandlerResult {
    let Some(name) = channel_arg(ctx, args) else {
        return Ok(());
    };

    match ctx.services.directory.enable(&name) {
        ChannelChange::Applied => {
            ctx.services.chat.join(&name);
            ctx.responder.respond_with_mention("channel enabled successfully");
        }
        ChannelChange::Unchanged => ctx.responder.respond_with_mention("channel already enabled"),
        ChannelChange::Unknown => ctx.responder.respond_with_mention("channel not found"),
    }
    Ok(())
}

pub async fn handle_disable(ctx: &Context, args: &[String], _next: Next) -> HandlerResult {
    let Some(name) = channel_arg(ctx, args) else {
        return Ok(());
    };

    match ctx.services.directory.disable(&name) {
        ChannelChange::Applied => {
            ctx.services.chat.part(&name);
            ctx.responder.respond_with_mention("channel disabled successfully");
        }
        ChannelChange::Unchanged => ctx.responder.respond_with_mention("channel already disabled"),
        ChannelChange::Unknown => ctx.responder.respond_with_mention("channel not found"),
    }
    Ok(())
}
