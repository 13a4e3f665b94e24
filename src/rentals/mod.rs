//! Rental read model
//!
//! Rentals are owned by the marketplace application. This module carries
//! the read model the relay needs: the status enum, the lookup seam, and
//! the SQLite and in-memory implementations behind it.

pub mod db;
pub mod models;
pub mod source;

pub use db::RentalDb;
pub use models::{Rental, RentalStatus};
pub use source::{InMemoryRentalSource, RentalStatusSource};
