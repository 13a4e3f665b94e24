//! Inbound frame dispatch and rental-status gating
//!
//! The relay forwards chat frames between participants of the same rental
//! while that rental is active. It holds no message history: frames exist
//! only in transit and in connected clients' local state.

use crate::relay::frame::Frame;
use crate::relay::registry::{ClientConnection, ConnectionRegistry};
use crate::rentals::{RentalStatus, RentalStatusSource};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rejection message for chat frames addressed to a rental that is not active
pub const RENTAL_NOT_ACTIVE: &str = "Messaging is only available for active rentals";

/// Rejection message for chat frames addressed to an unknown rental
pub const RENTAL_NOT_FOUND: &str = "Rental not found";

/// Rejection message when the status lookup itself fails
pub const STATUS_LOOKUP_FAILED: &str = "Unable to verify rental status";

/// Forwards chat frames between participants of the same rental
///
/// Both collaborators are injected: the connection registry so the relay
/// can be tested without sockets, and the rental status source so gating
/// can be backed by the platform database or an in-memory table.
pub struct ChatRelay {
    registry: Arc<ConnectionRegistry>,
    rentals: Arc<dyn RentalStatusSource>,
}

impl ChatRelay {
    /// Create a relay over the given registry and status source
    pub fn new(registry: Arc<ConnectionRegistry>, rentals: Arc<dyn RentalStatusSource>) -> Self {
        Self { registry, rentals }
    }

    /// Register a newly connected client
    pub async fn register(&self, connection: Arc<ClientConnection>) {
        self.registry.add(connection).await;
    }

    /// Remove a client and all of its room memberships
    pub async fn unregister(&self, connection_id: &str) {
        self.registry.remove(connection_id).await;
    }

    /// Number of currently connected clients
    pub async fn connection_count(&self) -> usize {
        self.registry.connection_count().await
    }

    /// Process one inbound text frame from a connection
    ///
    /// Malformed frames are dropped after a debug log; a bad frame from one
    /// client never affects other connections.
    pub async fn handle_text(&self, connection: &ClientConnection, text: &str) {
        let frame = match serde_json::from_str::<Frame>(text) {
            Ok(frame) => frame,
            Err(e) => {
                debug!(conn_id = %connection.id, error = %e, "dropping malformed frame");
                return;
            }
        };

        match frame {
            Frame::Join { rental_id } => {
                self.registry.join(&connection.id, &rental_id).await;
                debug!(conn_id = %connection.id, rental_id, "joined rental room");
            }
            Frame::Leave { rental_id } => {
                self.registry.leave(&connection.id, &rental_id).await;
                debug!(conn_id = %connection.id, rental_id, "left rental room");
            }
            Frame::Chat {
                rental_id,
                sender_id,
                content,
                ..
            } => {
                self.handle_chat(connection, rental_id, sender_id, content)
                    .await;
            }
            Frame::Ping => {
                connection.send_frame(&Frame::Pong);
            }
            // Clients have no business sending these; drop them
            Frame::Pong | Frame::Error { .. } => {}
        }
    }

    /// Gate a chat frame on rental status, then fan it out to the room
    async fn handle_chat(
        &self,
        connection: &ClientConnection,
        rental_id: String,
        sender_id: String,
        content: String,
    ) {
        let status = match self.rentals.rental_status(&rental_id).await {
            Ok(status) => status,
            Err(e) => {
                warn!(conn_id = %connection.id, rental_id, error = %e, "rental status lookup failed");
                connection.send_frame(&Frame::error(STATUS_LOOKUP_FAILED));
                return;
            }
        };

        match status {
            Some(RentalStatus::Active) => {
                // The rentalId on an accepted frame also establishes room
                // membership, so a sender hears replies without an explicit join.
                self.registry.join(&connection.id, &rental_id).await;

                let stamped = Frame::Chat {
                    rental_id: rental_id.clone(),
                    sender_id,
                    content,
                    timestamp: Some(Utc::now()),
                };
                let delivered = self
                    .registry
                    .fan_out(&rental_id, &stamped, Some(&connection.id))
                    .await;
                debug!(conn_id = %connection.id, rental_id, delivered, "forwarded chat frame");
            }
            Some(_) => {
                connection.send_frame(&Frame::error(RENTAL_NOT_ACTIVE));
            }
            None => {
                connection.send_frame(&Frame::error(RENTAL_NOT_FOUND));
            }
        }
    }
}
