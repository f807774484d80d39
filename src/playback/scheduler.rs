//! Auto-advance of finished songs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::playback::RoomRegistry;

/// Check every room each `period` and start the next song where one ended.
pub async fn run_scheduler(registry: Arc<RoomRegistry>, period: Duration, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => advance_all(&registry),
            _ = shutdown.recv() => {
                tracing::info!("Playback scheduler stopped");
                break;
            }
        }
    }
}

fn advance_all(registry: &RoomRegistry) {
    for manager in registry.managers() {
        if let Err(e) = manager.advance_if_finished() {
            tracing::error!(room = %manager.room(), error = %e, "Failed to advance playlist");
        }
    }
}
