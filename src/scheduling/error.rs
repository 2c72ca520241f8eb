use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::{AppointmentStatus, TimeParseError};

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Appointment store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Stored appointment is unreadable: {0}")]
    CorruptRecord(String),
}

impl SchedulingError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Only store connectivity failures are worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<DatabaseError> for SchedulingError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { id, .. } => Self::NotFound(id),
            ref e if e.is_corrupt_data() => Self::CorruptRecord(e.to_string()),
            ref e if e.is_constraint_violation() => Self::Validation(e.to_string()),
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<TimeParseError> for SchedulingError {
    fn from(err: TimeParseError) -> Self {
        Self::Validation(err.to_string())
    }
}
