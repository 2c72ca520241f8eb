//! API endpoint handlers.

pub mod activity;
pub mod appointments;
pub mod health;
