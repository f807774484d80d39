//! Configuration file watcher for hot reload.
//!
//! Only the playlist defaults are applied live; connection settings need a
//! restart.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};

use crate::config::loader::load_config;
use crate::config::schema::{BotConfig, PlaylistConfig};

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<BotConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<BotConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        match load_config(&path) {
                            Ok(new_config) => {
                                let _ = tx.send(new_config);
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    "Failed to reload config. Keeping current configuration."
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Swap playlist defaults whenever a reloaded config arrives.
pub async fn apply_updates(
    mut updates: mpsc::UnboundedReceiver<BotConfig>,
    defaults: Arc<ArcSwap<PlaylistConfig>>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(config) => {
                    if **defaults.load() != config.playlist {
                        tracing::info!(
                            min_views = config.playlist.min_views,
                            min_duration_secs = config.playlist.min_duration_secs,
                            max_duration_secs = config.playlist.max_duration_secs,
                            "Playlist defaults updated"
                        );
                        defaults.store(Arc::new(config.playlist));
                    }
                }
                None => break,
            },
            _ = shutdown.recv() => break,
        }
    }
}
