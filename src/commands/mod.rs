//! Chat command subsystem.
//!
//! # Data Flow
//! ```text
//! ChatMessage
//!     → dispatcher.rs (skip own lines, tokenize, match root command)
//!     → Context (responder, room manager, shared services)
//!     → root Router: !fm [count_usage, is_banned] → add::handle_command
//!         └─ prefix Router: ping | uptime | skip | set ... (middleware.rs gates)
//!              ├─ channels Router: add | enable | disable
//!              ├─ connections Router: irc | ws
//!              └─ set Router: minViews | minDuration | maxDuration | streamSync
//! ```
//!
//! # Design Decisions
//! - Routers are built once by [`build_router`] and shared behind `Arc`
//! - Privilege checks are middleware that stop the chain silently
//! - Handlers reply through the [`Responder`]; they never touch the chat
//!   connection directly

use std::sync::Arc;
use std::time::Instant;

use crate::broadcast::Broadcaster;
use crate::chat::{ChatControl, ChatTags, Privileges};
use crate::directory::{BanList, ChannelDirectory, SettingsStore};
use crate::outbound::Responder;
use crate::playback::{PlaybackError, PlaybackManager, RoomRegistry, VideoLookup};
use crate::routing::{handler, RouteError, Router};

pub mod add;
pub mod channels;
pub mod connections;
pub mod dispatcher;
pub mod middleware;
pub mod prefix;
pub mod set;

pub use dispatcher::Dispatcher;

/// Process-wide collaborators shared by every command.
pub struct Services {
    pub rooms: Arc<RoomRegistry>,
    pub directory: Arc<ChannelDirectory>,
    pub bans: Arc<BanList>,
    pub settings: Arc<SettingsStore>,
    /// `None` when no API key is configured; song requests are refused.
    pub lookup: Option<Arc<dyn VideoLookup>>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub chat: Arc<dyn ChatControl>,
    pub owner_id: String,
    pub owner_username: String,
    /// Root command, e.g. `!fm`.
    pub command: String,
    pub started_at: Instant,
}

/// Value threaded through one dispatch.
pub struct Context {
    pub responder: Responder,
    pub room: String,
    pub tags: Arc<ChatTags>,
    pub manager: Arc<PlaybackManager>,
    pub services: Arc<Services>,
}

impl Context {
    pub fn privileges(&self) -> Privileges {
        self.tags.privileges(&self.services.owner_id)
    }

    /// Reply to a failed playback operation.
    pub(crate) fn report(&self, err: PlaybackError, fallback: &str) {
        match err {
            PlaybackError::UserFacing { message } => self.responder.respond_with_mention(message),
            PlaybackError::Internal(e) => {
                tracing::error!(room = %self.room, error = %e, "Playback operation failed");
                self.responder.respond_with_mention(fallback);
            }
        }
    }
}

/// Wrap named `async fn(&Context, &[String], Next) -> HandlerResult`s as a
/// middleware chain ending in a handler.
macro_rules! chain {
    ($($f:path),+ $(,)?) => {
        vec![$(handler::<Context, _>(|ctx, args, next| Box::pin($f(ctx, args, next)))),+]
    };
}

/// Build the full command tree for `command` (e.g. `!fm`).
pub fn build_router(command: &str) -> Result<Arc<Router<Context>>, RouteError> {
    use middleware::{check_is_paused, count_usage, is_banned, is_owner, is_owner_broadcaster_mod, is_owner_or_owner_room};

    let mut channels_router = Router::new();
    channels_router.register("add", chain![channels::handle_add])?;
    channels_router.register("enable", chain![channels::handle_enable])?;
    channels_router.register("disable", chain![channels::handle_disable])?;

    let mut connections_router = Router::new();
    connections_router.register("irc", chain![connections::handle_irc])?;
    connections_router.register("ws", chain![connections::handle_ws])?;

    let mut set_router = Router::new();
    set_router.register("minViews", chain![set::handle_min_views])?;
    set_router.register("minDuration", chain![set::handle_min_duration])?;
    set_router.register("maxDuration", chain![set::handle_max_duration])?;
    set_router.register("streamSync", chain![set::handle_stream_sync])?;

    let set_keys: Arc<str> = set_router.keys().join(", ").into();
    let list_settings = handler::<Context, _>(move |ctx, _args, _next| {
        let keys = set_keys.clone();
        Box::pin(async move {
            ctx.responder
                .respond_with_mention(format!("available commands: {keys}"));
            Ok(())
        })
    });

    let mut prefix_router = Router::new();
    prefix_router.register("channels", chain![is_owner, prefix::handle_channels])?;
    prefix_router.register("uptime", chain![is_owner, prefix::handle_uptime])?;
    prefix_router.register("random", chain![is_owner, check_is_paused, prefix::handle_random])?;
    prefix_router.register("timer", chain![is_owner, check_is_paused, prefix::handle_timer])?;
    prefix_router.register("connections", chain![is_owner, prefix::handle_connections])?;

    prefix_router.register("ping", chain![is_owner_or_owner_room, prefix::handle_ping])?;

    prefix_router.register("ban", chain![is_owner_broadcaster_mod, prefix::handle_ban])?;
    prefix_router.register("unban", chain![is_owner_broadcaster_mod, prefix::handle_unban])?;
    prefix_router.register("clear", chain![is_owner_broadcaster_mod, prefix::handle_clear])?;
    prefix_router.register("disconnect", chain![is_owner_broadcaster_mod, prefix::handle_disconnect])?;
    for key in ["pause", "stop"] {
        prefix_router.register(key, chain![is_owner_broadcaster_mod, prefix::handle_pause])?;
    }
    for key in ["play", "start", "resume"] {
        prefix_router.register(key, chain![is_owner_broadcaster_mod, prefix::handle_play])?;
    }
    let mut set_chain = chain![is_owner_broadcaster_mod];
    set_chain.push(list_settings);
    prefix_router.register("set", set_chain)?;
    prefix_router.register("skip", chain![is_owner_broadcaster_mod, check_is_paused, prefix::handle_skip])?;

    prefix_router.register("help", chain![prefix::handle_help])?;
    prefix_router.register("search", chain![prefix::handle_search])?;
    prefix_router.register("song", chain![prefix::handle_song])?;
    prefix_router.register("voteskip", chain![check_is_paused, prefix::handle_voteskip])?;
    prefix_router.register("wrong", chain![prefix::handle_wrong])?;

    prefix_router.register_next_router("channels", Arc::new(channels_router))?;
    prefix_router.register_next_router("connections", Arc::new(connections_router))?;
    prefix_router.register_next_router("set", Arc::new(set_router))?;

    let mut root = Router::new();
    root.register(command, chain![count_usage, is_banned, add::handle_command])?;
    root.register_next_router(command, Arc::new(prefix_router))?;

    tracing::debug!(command = %command, "Command router built");
    Ok(Arc::new(root))
}
