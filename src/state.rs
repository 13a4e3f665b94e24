//! Shared application state

use crate::relay::ChatRelay;
use crate::rentals::RentalStatusSource;
use std::sync::Arc;
use std::time::Duration;

/// State shared across HTTP handlers and the socket endpoint
#[derive(Clone)]
pub struct AppState {
    /// Relay service forwarding chat frames
    pub relay: Arc<ChatRelay>,
    /// Read-only rental status collaborator
    pub rentals: Arc<dyn RentalStatusSource>,
    /// Interval between protocol-level keepalive pings
    pub keepalive: Duration,
}
