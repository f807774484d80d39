//! Viewer WebSocket sessions.
//!
//! # Data Flow
//! ```text
//! Viewer ──joinRoom──→ check channel enabled ──no──→ no42fm, close
//!                          │yes
//!                          ├─ RoomHub::subscribe (userCount to the room)
//!                          └─ song snapshot to this viewer
//! Viewer ──sync──────→ songSync with seconds left (known rooms only)
//! RoomHub events ─────→ Viewer
//! ```

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::broadcast::{ClientEvent, ServerEvent};
use crate::http::AppState;

type Joined = Option<(String, broadcast::Receiver<ServerEvent>)>;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

enum Flow {
    Continue,
    Close,
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let socket_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let mut shutdown = state.shutdown.subscribe();
    let mut joined: Joined = None;

    tracing::info!(socket_id = %socket_id, "New socket connection");

    loop {
        let flow = tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientEvent>(text.as_str()) {
                        Ok(event) => handle_client_event(event, &state, &mut sender, &mut joined).await,
                        Err(e) => {
                            tracing::debug!(socket_id = %socket_id, error = %e, "Ignoring malformed event");
                            Flow::Continue
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => Flow::Close,
                Some(Ok(_)) => Flow::Continue,
                Some(Err(e)) => {
                    tracing::debug!(socket_id = %socket_id, error = %e, "Socket error");
                    Flow::Close
                }
            },
            event = next_room_event(&mut joined) => match event {
                Ok(event) => send(&mut sender, &event).await,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(socket_id = %socket_id, skipped = skipped, "Viewer lagging, events dropped");
                    Flow::Continue
                }
                Err(RecvError::Closed) => Flow::Close,
            },
            _ = shutdown.recv() => Flow::Close,
        };

        if let Flow::Close = flow {
            break;
        }
    }

    if let Some((room, rx)) = joined {
        state.hub.unsubscribe(&room, rx);
        tracing::info!(socket_id = %socket_id, room = %room, "Viewer left");
    }
    let _ = sender.close().await;
}

async fn next_room_event(joined: &mut Joined) -> Result<ServerEvent, RecvError> {
    match joined {
        Some((_, rx)) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn handle_client_event(
    event: ClientEvent,
    state: &AppState,
    sender: &mut SplitSink<WebSocket, Message>,
    joined: &mut Joined,
) -> Flow {
    match event {
        ClientEvent::JoinRoom { room } => {
            let room = room.to_lowercase();
            if !state.directory.is_enabled(&room) {
                tracing::info!(room = %room, "Not enabled on channel");
                let _ = send(sender, &ServerEvent::No42fm).await;
                return Flow::Close;
            }

            if let Some((previous, rx)) = joined.take() {
                state.hub.unsubscribe(&previous, rx);
            }
            *joined = Some((room.clone(), state.hub.subscribe(&room)));
            tracing::info!(room = %room, "Joined room");

            match state.rooms.get_or_create(&room).snapshot() {
                Ok(Some((current, list))) => send(sender, &ServerEvent::Song { current, list }).await,
                Ok(None) => Flow::Continue,
                Err(e) => {
                    tracing::error!(room = %room, error = %e, "Failed to load song snapshot");
                    Flow::Continue
                }
            }
        }
        ClientEvent::Sync { room } => {
            let room = room.to_lowercase();
            match state.rooms.get(&room).and_then(|manager| manager.remaining_secs()) {
                Some(secs) => send(sender, &ServerEvent::SongSync(secs)).await,
                None => Flow::Continue,
            }
        }
    }
}

async fn send(sender: &mut SplitSink<WebSocket, Message>, event: &ServerEvent) -> Flow {
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            return Flow::Continue;
        }
    };

    match sender.send(Message::Text(payload.into())).await {
        Ok(()) => Flow::Continue,
        Err(_) => Flow::Close,
    }
}
