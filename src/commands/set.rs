//! Handlers for `!fm set <setting> <value>`.

use crate::commands::Context;
use crate::directory::RoomSettings;
use crate::routing::{HandlerResult, Next};

/// Parse `args[0]` as a count, replying when it is missing or malformed.
fn parse_number(ctx: &Context, args: &[String], missing: &str) -> Option<u64> {
    let Some(raw) = args.first() else {
        ctx.responder.respond(missing);
        return None;
    };
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            ctx.responder.respond("Please provide a number");
            None
        }
    }
}

fn apply(ctx: &Context, f: impl FnOnce(&mut RoomSettings)) {
    ctx.services.settings.update(&ctx.room, f);
    tracing::info!(room = %ctx.room, settings = ?ctx.services.settings.effective(&ctx.room), "Room settings changed");
}

pub async fn handle_min_views(ctx: &Context, args: &[String], _next: Next) -> HandlerResult {
    if let Some(views) = parse_number(ctx, args, "No views count provided") {
        apply(ctx, |s| s.min_views = Some(views));
        ctx.responder.respond(format!("Minimum views changed to {views} views"));
    }
    Ok(())
}

pub async fn handle_min_duration(ctx: &Context, args: &[String], _next: Next) -> HandlerResult {
    if let Some(secs) = parse_number(ctx, args, "No length provided") {
        apply(ctx, |s| s.min_duration_secs = Some(secs));
        ctx.responder.respond(format!("Minimum duration changed to {secs} seconds"));
    }
    Ok(())
}

pub async fn handle_max_duration(ctx: &Context, args: &[String], _next: Next) -> HandlerResult {
    if let Some(secs) = parse_number(ctx, args, "No length provided") {
        apply(ctx, |s| s.max_duration_secs = Some(secs));
        ctx.responder.respond(format!("Maximum duration changed to {secs} seconds"));
    }
    Ok(())
}

pub async fn handle_stream_sync(ctx: &Context, args: &[String], _next: Next) -> HandlerResult {
    let Some(raw) = args.first() else {
        ctx.responder.respond("No value provided");
        return Ok(());
    };

    let enabled = match raw.to_lowercase().as_str() {
        "true" => true,
        "false" => false,
        _ => {
            ctx.responder.respond("Please provide a true or false value");
            return Ok(());
        }
    };

    apply(ctx, |s| s.stream_sync = enabled);
    ctx.responder.respond(format!("Changed stream sync to {enabled}"));
    Ok(())
}
