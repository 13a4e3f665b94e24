//! Rental status API handlers
//!
//! Read-only HTTP surface over the rental status source, used by clients
//! to decide whether to enable the chat widget before opening a socket.

use crate::error::AppError;
use crate::rentals::RentalStatus;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;

/// Rental status response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalStatusResponse {
    /// Rental the status belongs to
    pub rental_id: String,
    /// Current lifecycle status
    pub status: RentalStatus,
}

/// GET /api/rentals/:id/status - Look up a rental's lifecycle status
pub async fn get_rental_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RentalStatusResponse>, AppError> {
    let status = state
        .rentals
        .rental_status(&id)
        .await?
        .ok_or_else(|| AppError::RentalNotFound(id.clone()))?;

    Ok(Json(RentalStatusResponse {
        rental_id: id,
        status,
    }))
}
