//! Rental status lookup seam
//!
//! The relay consults a status source before forwarding chat frames. The
//! production implementation reads the platform database; the in-memory
//! implementation backs tests and embedded use.

use crate::error::AppError;
use crate::rentals::models::RentalStatus;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Read-only rental status lookup
#[async_trait]
pub trait RentalStatusSource: Send + Sync {
    /// Current status of the rental, or `None` if the rental does not exist
    async fn rental_status(&self, rental_id: &str) -> Result<Option<RentalStatus>, AppError>;
}

/// In-memory status table
#[derive(Default)]
pub struct InMemoryRentalSource {
    statuses: RwLock<HashMap<String, RentalStatus>>,
}

impl InMemoryRentalSource {
    /// Create an empty status table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a rental's status
    pub async fn set_status(&self, rental_id: &str, status: RentalStatus) {
        self.statuses
            .write()
            .await
            .insert(rental_id.to_string(), status);
    }
}

#[async_trait]
impl RentalStatusSource for InMemoryRentalSource {
    async fn rental_status(&self, rental_id: &str) -> Result<Option<RentalStatus>, AppError> {
        Ok(self.statuses.read().await.get(rental_id).copied())
    }
}
