//! Advisory slot conflict detection.
//!
//! A conflict is an active appointment on the same date at the exact same
//! time string. Conflicts are reported, never enforced: the caller books
//! anyway and shows the warning.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::SchedulingError;
use super::store::AppointmentStore;
use crate::models::{Appointment, AppointmentStatus, AppointmentTime};

/// Warning payload describing the appointment already holding a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictWarning {
    pub conflicting_id: String,
    pub patient_name: String,
    pub date: String,
    pub time: AppointmentTime,
    pub message: String,
}

impl From<&Appointment> for ConflictWarning {
    fn from(existing: &Appointment) -> Self {
        Self {
            conflicting_id: existing.id.clone(),
            patient_name: existing.patient_name.clone(),
            date: existing.date.clone(),
            time: existing.time,
            message: format!(
                "{} already has an appointment on {} at {}",
                existing.patient_name, existing.date, existing.time
            ),
        }
    }
}

/// Find an active appointment occupying `date` at `time`.
///
/// On-call bookings never conflict. With several matches (a pre-existing
/// double booking) the earliest returned by the store wins.
pub fn find_conflict<S: AppointmentStore + ?Sized>(
    store: &S,
    date: &str,
    time: &AppointmentTime,
    exclude_id: Option<&str>,
) -> Result<Option<Appointment>, SchedulingError> {
    if time.is_on_call() {
        return Ok(None);
    }

    let candidates = store.query_by_date_and_status(date, Some(time), AppointmentStatus::ACTIVE)?;
    let conflict = candidates.into_iter().find(|existing| {
        Some(existing.id.as_str()) != exclude_id
            && existing.status.is_active()
            && existing.time == *time
    });

    debug!(
        date,
        time = %time,
        conflict_id = conflict.as_ref().map(|c| c.id.as_str()),
        "Slot conflict check"
    );
    Ok(conflict)
}
