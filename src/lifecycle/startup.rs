//! Startup orchestration.
//!
//! # Order
//! 1. Shared state (stores, hub, directory, settings)
//! 2. Outbound queue and chat client
//! 3. Command router and dispatcher
//! 4. Background tasks (queue ticks, scheduler, config watcher)
//! 5. HTTP listener last, so viewers never see a half-built bot

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::broadcast::{Broadcaster, RoomHub};
use crate::chat::{ChatClient, ChatControl};
use crate::commands::{build_router, Dispatcher, Services};
use crate::config::{watcher, BotConfig, ConfigWatcher};
use crate::directory::{BanList, ChannelDirectory, SettingsStore};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::Shutdown;
use crate::outbound::{OutboundQueue, ReplySink};
use crate::playback::scheduler::run_scheduler;
use crate::playback::{LookupError, MemoryStore, RoomRegistry, StateStore, VideoLookup, YoutubeLookup};
use crate::routing::RouteError;

/// Fatal startup error.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to build command router: {0}")]
    Router(#[from] RouteError),

    #[error("failed to build video lookup client: {0}")]
    Lookup(#[from] LookupError),

    #[error("failed to watch config file: {0}")]
    Watcher(#[from] notify::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Start every subsystem and serve until `shutdown` fires.
pub async fn run(config: BotConfig, config_path: Option<&Path>, shutdown: Shutdown) -> Result<(), StartupError> {
    let defaults = Arc::new(ArcSwap::from_pointee(config.playlist.clone()));
    let hub = Arc::new(RoomHub::default());
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
    let rooms = Arc::new(RoomRegistry::new(store, hub.clone()));

    let directory = Arc::new(ChannelDirectory::new());
    for channel in &config.chat.channels {
        directory.add(channel);
        directory.enable(channel);
    }

    let lookup: Option<Arc<dyn VideoLookup>> = if config.lookup.api_key.is_empty() {
        tracing::warn!("No video API key configured, song requests are disabled");
        None
    } else {
        Some(Arc::new(YoutubeLookup::new(&config.lookup)?))
    };

    let queue = Arc::new(OutboundQueue::from_config(&config.queue, config.environment));
    let (chat_client, chat_handle, inbound) = ChatClient::new(config.chat.clone());
    let chat_handle = Arc::new(chat_handle);

    let services = Arc::new(Services {
        rooms: rooms.clone(),
        directory: directory.clone(),
        bans: Arc::new(BanList::new()),
        settings: Arc::new(SettingsStore::new(defaults.clone())),
        lookup,
        broadcaster: hub.clone() as Arc<dyn Broadcaster>,
        chat: chat_handle.clone() as Arc<dyn ChatControl>,
        owner_id: config.chat.owner_id.clone(),
        owner_username: config.chat.owner_username.clone(),
        command: config.chat.root_command(),
        started_at: Instant::now(),
    });

    let router = build_router(&services.command)?;
    let dispatcher = Dispatcher::new(router, services, queue.clone(), chat_handle as Arc<dyn ReplySink>);

    let mut tasks: Vec<JoinHandle<()>> = vec![
        tokio::spawn(queue.run(shutdown.subscribe())),
        tokio::spawn(chat_client.run(shutdown.subscribe())),
        tokio::spawn(dispatcher.run(inbound, shutdown.subscribe())),
        tokio::spawn(run_scheduler(
            rooms.clone(),
            Duration::from_millis(config.playlist.scheduler_interval_ms),
            shutdown.subscribe(),
        )),
    ];

    // Dropping the watcher stops file notifications, so it lives until return.
    let _watcher = match config_path {
        Some(path) => {
            let (config_watcher, updates) = ConfigWatcher::new(path);
            let handle = config_watcher.run()?;
            tasks.push(tokio::spawn(watcher::apply_updates(updates, defaults, shutdown.subscribe())));
            Some(handle)
        }
        None => None,
    };

    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.server.bind_address.clone(),
            source,
        })?;
    tracing::info!(address = %config.server.bind_address, "Listening for viewers");

    let server = HttpServer::new(AppState {
        hub,
        rooms,
        directory,
        shutdown: shutdown.clone(),
    });
    let result = server.run(listener, shutdown.subscribe()).await;

    // Stop background tasks if the server exited on its own.
    shutdown.trigger();
    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Background task failed");
        }
    }

    result?;
    Ok(())
}
