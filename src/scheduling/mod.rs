//! Appointment scheduling and lifecycle rules.
//!
//! `engine` is the entry point used by the API layer. The other modules hold
//! the pieces it composes: the store boundary, advisory conflict detection,
//! delay arithmetic and the status state machine.

pub mod conflict;
pub mod delay;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod store;

pub use conflict::{find_conflict, ConflictWarning};
pub use delay::{apply_delay, revert_delay, DelayApplied, DelayReverted, MAX_DELAY_MINUTES};
pub use engine::{BookingOutcome, EditOutcome, SchedulingEngine, StatusOutcome};
pub use error::SchedulingError;
pub use lifecycle::{allowed_transitions, can_transition, follow_up_draft, validate_transition};
pub use store::{AppointmentStore, SqliteAppointmentStore};
