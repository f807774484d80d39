//! Inbound chat message dispatch.
//!
//! # Responsibilities
//! - Ignore the bot's own lines and anything not starting with the root command
//! - Build a fresh [`Context`] per command
//! - Run each command in its own task, inside a span carrying a command id
//! - Log and count failures without stopping the dispatch loop

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::chat::{parse_message, ChatMessage};
use crate::commands::{Context, Services};
use crate::observability::metrics;
use crate::outbound::{OutboundQueue, ReplySink, Responder};
use crate::routing::Router;

pub struct Dispatcher {
    router: Arc<Router<Context>>,
    services: Arc<Services>,
    queue: Arc<OutboundQueue>,
    sink: Arc<dyn ReplySink>,
}

impl Dispatcher {
    pub fn new(
        router: Arc<Router<Context>>,
        services: Arc<Services>,
        queue: Arc<OutboundQueue>,
        sink: Arc<dyn ReplySink>,
    ) -> Self {
        Self {
            router,
            services,
            queue,
            sink,
        }
    }

    /// Spawn the command in `message`, if it is one.
    pub fn dispatch(&self, message: ChatMessage) -> Option<JoinHandle<()>> {
        if message.is_self {
            return None;
        }

        let segments = parse_message(&message.text);
        if segments.first() != Some(&self.services.command) {
            return None;
        }

        metrics::record_command(&message.room);
        let ctx = self.context(message);
        let router = self.router.clone();

        let span = tracing::info_span!(
            "command",
            id = %Uuid::new_v4(),
            room = %ctx.room,
            user = %ctx.tags.username,
        );

        Some(tokio::spawn(
            async move {
                tracing::info!(segments = ?segments, "Dispatching command");
                if let Err(e) = router.route(&ctx, &segments, 0).await {
                    metrics::record_dispatch_failure();
                    tracing::error!(error = %e, "Command failed");
                }
            }
            .instrument(span),
        ))
    }

    fn context(&self, message: ChatMessage) -> Context {
        let tags = Arc::new(message.tags);
        Context {
            responder: Responder::new(self.sink.clone(), tags.clone(), message.room.clone(), self.queue.clone()),
            manager: self.services.rooms.get_or_create(&message.room),
            room: message.room,
            tags,
            services: self.services.clone(),
        }
    }

    /// Dispatch inbound messages until the chat client stops or shutdown.
    pub async fn run(self, mut inbound: mpsc::UnboundedReceiver<ChatMessage>, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                message = inbound.recv() => match message {
                    Some(message) => {
                        self.dispatch(message);
                    }
                    None => break,
                },
                _ = shutdown.recv() => break,
            }
        }
        tracing::info!("Dispatcher stopped");
    }
}
