//! Handlers for `!fm connections <irc|ws>`.

use crate::commands::Context;
use crate::routing::{HandlerResult, Next};

pub async fn handle_irc(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    let count = ctx.services.chat.channels().len();
    ctx.responder.respond(format!("Connected channels: {count}"));
    Ok(())
}

pub async fn handle_ws(ctx: &Context, _args: &[String], _next: Next) -> HandlerResult {
    let count = ctx.services.broadcaster.total_viewers();
    ctx.responder.respond(format!("Connected sockets: {count}"));
    Ok(())
}
