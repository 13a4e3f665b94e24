//! Connection registry and rental-room fan-out
//!
//! Tracks every open socket connection together with the rental rooms it
//! has joined, and delivers serialized frames to room members. The registry
//! is an explicit, injectable object so the relay can be exercised in
//! isolation instead of going through a module-level singleton.

use crate::relay::frame::Frame;
use axum::extract::ws::Message;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

/// Unique identifier for a socket connection (one per browser tab)
pub type ConnectionId = String;

/// Identifier of a rental room
pub type RentalId = String;

/// A connected client and its outbound message channel
///
/// The channel is drained by the connection's socket writer task; a failed
/// send means the writer has gone away and the connection is dead.
pub struct ClientConnection {
    /// Server-generated connection id
    pub id: ConnectionId,
    /// User id supplied by the client at upgrade time, if any
    pub user_id: Option<String>,
    tx: mpsc::UnboundedSender<Message>,
}

impl ClientConnection {
    /// Create a connection wrapping the given outbound channel
    pub fn new(
        id: ConnectionId,
        user_id: Option<String>,
        tx: mpsc::UnboundedSender<Message>,
    ) -> Self {
        Self { id, user_id, tx }
    }

    /// Queue a raw socket message for delivery
    ///
    /// Returns `false` if the connection's writer task has gone away.
    pub fn send(&self, message: Message) -> bool {
        self.tx.send(message).is_ok()
    }

    /// Serialize and queue a single frame for delivery
    pub fn send_frame(&self, frame: &Frame) -> bool {
        match serde_json::to_string(frame) {
            Ok(json) => self.send(Message::Text(json)),
            Err(e) => {
                warn!(conn_id = %self.id, error = %e, "failed to serialize frame");
                false
            }
        }
    }
}

/// Connections and room memberships guarded by a single lock
///
/// One lock over both tables means membership and addressing can never
/// disagree: a removed connection is gone from every room in the same
/// critical section.
#[derive(Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, Arc<ClientConnection>>,
    rooms: HashMap<RentalId, HashSet<ConnectionId>>,
}

impl RegistryInner {
    fn remove_connection(&mut self, connection_id: &str) {
        if self.connections.remove(connection_id).is_some() {
            self.rooms.retain(|_, members| {
                members.remove(connection_id);
                !members.is_empty()
            });
        }
    }
}

/// Registry of open connections keyed by id, with rental-room membership
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Add a connection
    pub async fn add(&self, connection: Arc<ClientConnection>) {
        let mut inner = self.inner.write().await;
        inner.connections.insert(connection.id.clone(), connection);
    }

    /// Remove a connection and clear all of its room memberships
    pub async fn remove(&self, connection_id: &str) {
        let mut inner = self.inner.write().await;
        inner.remove_connection(connection_id);
    }

    /// Join a connection to a rental room
    ///
    /// Returns `false` if the connection is not registered; membership is
    /// never created for a connection the registry does not know about.
    pub async fn join(&self, connection_id: &str, rental_id: &str) -> bool {
        let mut inner = self.inner.write().await;
        if !inner.connections.contains_key(connection_id) {
            return false;
        }
        inner
            .rooms
            .entry(rental_id.to_string())
            .or_default()
            .insert(connection_id.to_string());
        true
    }

    /// Remove a connection from a rental room
    pub async fn leave(&self, connection_id: &str, rental_id: &str) {
        let mut inner = self.inner.write().await;
        if let Some(members) = inner.rooms.get_mut(rental_id) {
            members.remove(connection_id);
            if members.is_empty() {
                inner.rooms.remove(rental_id);
            }
        }
    }

    /// Whether a connection is currently a member of a rental room
    pub async fn is_member(&self, connection_id: &str, rental_id: &str) -> bool {
        let inner = self.inner.read().await;
        inner
            .rooms
            .get(rental_id)
            .is_some_and(|members| members.contains(connection_id))
    }

    /// Serialize a frame once and deliver it to every member of a rental
    /// room except `exclude`
    ///
    /// Members whose channel is closed are pruned from the registry, so a
    /// closed connection is never addressable again. Returns the number of
    /// members the frame was delivered to.
    pub async fn fan_out(&self, rental_id: &str, frame: &Frame, exclude: Option<&str>) -> usize {
        let json = match serde_json::to_string(frame) {
            Ok(j) => j,
            Err(e) => {
                warn!(rental_id, error = %e, "failed to serialize frame for fan-out");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut stale = Vec::new();
        {
            let inner = self.inner.read().await;
            let Some(members) = inner.rooms.get(rental_id) else {
                return 0;
            };
            for member_id in members {
                if exclude == Some(member_id.as_str()) {
                    continue;
                }
                match inner.connections.get(member_id) {
                    Some(conn) if conn.send(Message::Text(json.clone())) => delivered += 1,
                    _ => stale.push(member_id.clone()),
                }
            }
            debug!(rental_id, delivered, "fanned out frame");
        }

        if !stale.is_empty() {
            let mut inner = self.inner.write().await;
            for id in &stale {
                debug!(conn_id = %id, "pruning dead connection");
                inner.remove_connection(id);
            }
        }

        delivered
    }

    /// Number of registered connections
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_connection(id: &str) -> (Arc<ClientConnection>, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(ClientConnection::new(id.to_string(), None, tx)),
            rx,
        )
    }

    fn chat(rental_id: &str, content: &str) -> Frame {
        Frame::Chat {
            rental_id: rental_id.to_string(),
            sender_id: "sender".to_string(),
            content: content.to_string(),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn add_and_remove_connections() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = make_connection("c1");
        registry.add(conn).await;
        assert_eq!(registry.connection_count().await, 1);
        registry.remove("c1").await;
        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn remove_nonexistent_connection_is_noop() {
        let registry = ConnectionRegistry::new();
        registry.remove("no_such").await;
        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn join_requires_registered_connection() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.join("ghost", "R1").await);
        assert!(!registry.is_member("ghost", "R1").await);

        let (conn, _rx) = make_connection("c1");
        registry.add(conn).await;
        assert!(registry.join("c1", "R1").await);
        assert!(registry.is_member("c1", "R1").await);
    }

    #[tokio::test]
    async fn fan_out_excludes_sender() {
        let registry = ConnectionRegistry::new();
        let (a, mut a_rx) = make_connection("a");
        let (b, mut b_rx) = make_connection("b");
        registry.add(a).await;
        registry.add(b).await;
        registry.join("a", "R1").await;
        registry.join("b", "R1").await;

        let delivered = registry.fan_out("R1", &chat("R1", "hello"), Some("a")).await;
        assert_eq!(delivered, 1);
        assert!(b_rx.try_recv().is_ok());
        assert!(a_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn fan_out_does_not_cross_rooms() {
        let registry = ConnectionRegistry::new();
        let (a, _a_rx) = make_connection("a");
        let (b, mut b_rx) = make_connection("b");
        registry.add(a).await;
        registry.add(b).await;
        registry.join("a", "R1").await;
        registry.join("b", "R2").await;

        let delivered = registry.fan_out("R1", &chat("R1", "hello"), Some("a")).await;
        assert_eq!(delivered, 0);
        assert!(b_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn fan_out_to_unknown_room_delivers_nothing() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.fan_out("R1", &chat("R1", "hello"), None).await, 0);
    }

    #[tokio::test]
    async fn leave_stops_delivery() {
        let registry = ConnectionRegistry::new();
        let (a, _a_rx) = make_connection("a");
        let (b, mut b_rx) = make_connection("b");
        registry.add(a).await;
        registry.add(b).await;
        registry.join("a", "R1").await;
        registry.join("b", "R1").await;
        registry.leave("b", "R1").await;

        let delivered = registry.fan_out("R1", &chat("R1", "hello"), Some("a")).await;
        assert_eq!(delivered, 0);
        assert!(b_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn remove_clears_all_memberships() {
        let registry = ConnectionRegistry::new();
        let (a, _a_rx) = make_connection("a");
        registry.add(a).await;
        registry.join("a", "R1").await;
        registry.join("a", "R2").await;
        registry.remove("a").await;
        assert!(!registry.is_member("a", "R1").await);
        assert!(!registry.is_member("a", "R2").await);
    }

    #[tokio::test]
    async fn fan_out_prunes_closed_connections() {
        let registry = ConnectionRegistry::new();
        let (a, _a_rx) = make_connection("a");
        let (b, b_rx) = make_connection("b");
        registry.add(a).await;
        registry.add(b).await;
        registry.join("a", "R1").await;
        registry.join("b", "R1").await;

        // Simulate an abruptly closed socket: the writer's receiver is gone
        drop(b_rx);

        let delivered = registry.fan_out("R1", &chat("R1", "hello"), Some("a")).await;
        assert_eq!(delivered, 0);
        assert_eq!(registry.connection_count().await, 1);
        assert!(!registry.is_member("b", "R1").await);
    }

    #[tokio::test]
    async fn fan_out_payload_is_frame_json() {
        let registry = ConnectionRegistry::new();
        let (a, mut a_rx) = make_connection("a");
        registry.add(a).await;
        registry.join("a", "R1").await;

        registry.fan_out("R1", &chat("R1", "hello"), None).await;
        match a_rx.try_recv().unwrap() {
            Message::Text(text) => {
                let frame: Frame = serde_json::from_str(&text).unwrap();
                assert_eq!(frame, chat("R1", "hello"));
            }
            other => panic!("expected text message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_frame_reports_closed_channel() {
        let (conn, rx) = make_connection("c1");
        assert!(conn.send_frame(&Frame::Pong));
        drop(rx);
        assert!(!conn.send_frame(&Frame::Pong));
    }
}
