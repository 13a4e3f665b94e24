//! WebSocket endpoint for the rental chat relay
//!
//! Handles the `/ws` upgrade, wires each connection into the relay, and
//! keeps the link alive with protocol-level pings. One connection per
//! browser tab; closing the socket tears everything down.

use crate::relay::registry::ClientConnection;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

/// Query parameters accepted on the upgrade request
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    /// User id supplied by the client, recorded on the connection
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// WebSocket upgrade handler for `GET /ws`
///
/// # Arguments
/// * `ws` - WebSocket upgrade request
/// * `params` - Optional `userId` query parameter
/// * `state` - Shared application state holding the relay
///
/// # Returns
/// * `Response` - HTTP response initiating the WebSocket connection
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params.user_id))
}

// Drive one relay connection until either side closes
async fn handle_socket(socket: WebSocket, state: AppState, user_id: Option<String>) {
    let (mut sender, mut receiver) = socket.split();

    let connection_id = Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let connection = Arc::new(ClientConnection::new(
        connection_id.clone(),
        user_id,
        tx.clone(),
    ));

    state.relay.register(connection.clone()).await;
    info!(conn_id = %connection_id, user_id = ?connection.user_id, "chat client connected");

    // Task to forward queued messages to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(e) = sender.send(message).await {
                error!("failed to send frame: {}", e);
                break;
            }
        }
    });

    // Task to send periodic protocol pings
    let ping_tx = tx.clone();
    let keepalive = state.keepalive;
    let mut ping_task = tokio::spawn(async move {
        loop {
            tokio::time::sleep(keepalive).await;
            if ping_tx.send(Message::Ping(vec![])).is_err() {
                break;
            }
        }
    });

    // Feed inbound frames to the relay
    let relay = state.relay.clone();
    let conn = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    relay.handle_text(&conn, &text).await;
                }
                Ok(Message::Close(_)) => {
                    info!(conn_id = %conn.id, "chat client disconnected");
                    break;
                }
                Ok(Message::Pong(_)) => {
                    // Client answered a keepalive ping
                }
                Err(e) => {
                    error!(conn_id = %conn.id, "websocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // Whichever task finishes first tears down the rest
    tokio::select! {
        _ = &mut send_task => {
            ping_task.abort();
            recv_task.abort();
        }
        _ = &mut ping_task => {
            send_task.abort();
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
            ping_task.abort();
        }
    }

    state.relay.unregister(&connection_id).await;
    info!(conn_id = %connection_id, "chat connection closed");
}
