//! Rental data models
//!
//! The rental entity is owned by the marketplace application; the relay
//! only reads it to decide whether messaging is permitted.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle status of a rental
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    /// Booking requested, not yet confirmed
    Pending,
    /// Rental underway; messaging is permitted
    Active,
    /// Rental finished
    Completed,
    /// Rental called off before it started
    Canceled,
}

impl RentalStatus {
    /// Convert the status to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Active => "active",
            RentalStatus::Completed => "completed",
            RentalStatus::Canceled => "canceled",
        }
    }

    /// Whether chat is permitted in this status
    pub fn allows_messaging(&self) -> bool {
        matches!(self, RentalStatus::Active)
    }
}

impl From<&str> for RentalStatus {
    fn from(s: &str) -> Self {
        match s {
            "active" => RentalStatus::Active,
            "completed" => RentalStatus::Completed,
            "canceled" => RentalStatus::Canceled,
            _ => RentalStatus::Pending,
        }
    }
}

/// A rental booking between a renter and an aircraft owner
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rental {
    /// Unique identifier for the rental
    pub id: String,
    /// User id of the renter
    pub renter_id: String,
    /// User id of the aircraft owner
    pub owner_id: String,
    /// Aircraft being rented
    pub aircraft_id: String,
    /// Lifecycle status, stored as its string form in the database
    pub status: String,
    /// When the rental was created (Unix timestamp)
    pub created_at: i64,
    /// When the rental was last updated (Unix timestamp)
    pub updated_at: i64,
}

impl Rental {
    /// Create a new pending rental
    pub fn new(id: String, renter_id: String, owner_id: String, aircraft_id: String) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id,
            renter_id,
            owner_id,
            aircraft_id,
            status: RentalStatus::Pending.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Get the status as its enum form
    pub fn status_enum(&self) -> RentalStatus {
        RentalStatus::from(self.status.as_str())
    }
}
