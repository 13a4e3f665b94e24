//! Rental chat relay
//!
//! Wire frames, the connection registry, the gating service, and the
//! socket endpoint that ties them to axum.

pub mod frame;
pub mod registry;
pub mod service;
pub mod socket;

pub use frame::Frame;
pub use registry::{ClientConnection, ConnectionId, ConnectionRegistry, RentalId};
pub use service::ChatRelay;
