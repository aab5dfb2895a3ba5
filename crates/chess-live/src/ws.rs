//! WebSocket transport: one socket per client, text frames carry JSON.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::controller::GameSessionController;
use crate::error::LiveGameError;
use crate::protocol::ServerMessage;
use crate::session::{ChannelConnection, Connection, ConnectionId};

/// Shared state for the HTTP router.
pub struct AppState {
    pub controller: Arc<GameSessionController>,
    /// Capacity of each connection's outbound queue.
    pub outbound_buffer: usize,
}

/// Create the router serving the WebSocket upgrade on `ws_path`.
pub fn create_router(state: Arc<AppState>, ws_path: &str) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(ws_path, get(ws_handler))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let (channel, outbound) = ChannelConnection::new(state.outbound_buffer);
    let conn_id = channel.id();
    let conn: Arc<dyn Connection> = channel;
    tracing::debug!(conn = %conn_id, "socket opened");

    let writer = tokio::spawn(forward_events(outbound, sender, conn_id));

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => state.controller.handle_text(&conn, &text).await,
            Ok(Message::Binary(_)) => {
                let err = LiveGameError::MalformedCommand {
                    reason: "commands must be sent as text frames".to_string(),
                };
                if let Err(e) = conn.send(&ServerMessage::error(&err)) {
                    tracing::warn!(conn = %conn_id, error = %e, "could not deliver error event");
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn = %conn_id, error = %e, "socket error");
                break;
            }
        }
    }

    // Unregistering drops the last senders; the writer then flushes what is
    // still queued and exits.
    state.controller.disconnect(conn_id);
    drop(conn);
    if let Err(e) = writer.await {
        tracing::warn!(conn = %conn_id, error = %e, "writer task failed");
    }
    tracing::debug!(conn = %conn_id, "socket closed");
}

/// Write queued events to `sink` until every sender is gone or a write
/// fails, then close the sink.
async fn forward_events<S>(
    mut outbound: mpsc::Receiver<ServerMessage>,
    mut sink: S,
    conn_id: ConnectionId,
) where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    while let Some(message) = outbound.recv().await {
        let text = match message.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(conn = %conn_id, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = sink.send(Message::Text(text)).await {
            tracing::debug!(conn = %conn_id, error = %e, "socket write failed");
            return;
        }
    }
    let _ = sink.close().await;
}
