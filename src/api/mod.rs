//! API module
//!
//! Contains HTTP request handlers for the relay's REST surface

pub mod rentals;
