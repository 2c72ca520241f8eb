//! Repository layer: entity-scoped database operations.

mod activity;
mod appointment;

pub use activity::*;
pub use appointment::*;
