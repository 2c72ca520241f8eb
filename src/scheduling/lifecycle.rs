//! Appointment status state machine.
//!
//! ```text
//! scheduled ──► confirmed ──► completed
//!     │             └───────► missed
//!     ├──► completed
//!     ├──► missed
//!     └──► cancelled
//! ```
//!
//! `completed`, `missed` and `cancelled` are terminal. Completion is the only
//! transition with an engine-level side effect: it suggests a follow-up.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::SchedulingError;
use crate::models::AppointmentStatus::{self, *};
use crate::models::NewAppointment;
use crate::models::Appointment;

/// Statuses reachable from `from` through the engine.
pub fn allowed_transitions(from: AppointmentStatus) -> &'static [AppointmentStatus] {
    match from {
        Scheduled => &[Confirmed, Cancelled, Completed, Missed],
        Confirmed => &[Completed, Missed],
        Completed | Missed | Cancelled => &[],
    }
}

pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Outcome of a legal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEffect {
    pub follow_up_suggested: bool,
}

/// Check a requested transition before anything is written.
pub fn validate_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<TransitionEffect, SchedulingError> {
    if !can_transition(from, to) {
        warn!(from = %from, to = %to, "Rejected status transition");
        return Err(SchedulingError::InvalidTransition { from, to });
    }
    Ok(TransitionEffect {
        follow_up_suggested: to == Completed,
    })
}

/// Booking form pre-filled from a completed appointment. The caller picks the
/// date and time, then books it like any other appointment.
pub fn follow_up_draft(completed: &Appointment) -> Result<NewAppointment, SchedulingError> {
    if completed.status != Completed {
        return Err(SchedulingError::validation(format!(
            "Follow-ups are offered for completed appointments, not {}",
            completed.status
        )));
    }
    Ok(NewAppointment {
        patient_name: completed.patient_name.clone(),
        patient_phone: completed.patient_phone.clone(),
        doctor_id: completed.doctor_id.clone(),
        doctor_name: completed.doctor_name.clone(),
        is_follow_up: true,
        previous_appointment_id: Some(completed.id.clone()),
        ..NewAppointment::default()
    })
}
