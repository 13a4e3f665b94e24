//! Wire format for relay socket frames
//!
//! Every frame is a JSON-encoded text message tagged by a `type` field.
//! Chat frames arrive from clients without a timestamp; the relay stamps
//! the current UTC time before fanning them out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Socket frame types exchanged between clients and the relay
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Frame {
    /// Chat message addressed to a rental room
    #[serde(rename = "chat", rename_all = "camelCase")]
    Chat {
        /// Rental the message belongs to
        rental_id: String,
        /// User id of the sender
        sender_id: String,
        /// Message body
        content: String,
        /// Server-assigned delivery time; absent on frames sent by clients
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
    /// Subscribe the connection to a rental room
    #[serde(rename = "join", rename_all = "camelCase")]
    Join {
        /// Rental room to join
        rental_id: String,
    },
    /// Unsubscribe the connection from a rental room
    #[serde(rename = "leave", rename_all = "camelCase")]
    Leave {
        /// Rental room to leave
        rental_id: String,
    },
    /// Rejection notice sent back to the offending connection only
    #[serde(rename = "error")]
    Error {
        /// Human-readable reason
        message: String,
    },
    /// Application-level keepalive probe
    #[serde(rename = "ping")]
    Ping,
    /// Response to an application-level ping
    #[serde(rename = "pong")]
    Pong,
}

impl Frame {
    /// Build an error frame from any message
    pub fn error(message: impl Into<String>) -> Self {
        Frame::Error {
            message: message.into(),
        }
    }
}
