//! "Running late" adjustments.
//!
//! Pure computations over an appointment snapshot. The engine persists the
//! resulting field set in one update; nothing here touches the store.

use serde::Serialize;

use super::error::SchedulingError;
use crate::models::{Actor, Appointment, AppointmentPatch, AppointmentTime, TimeOfDay, MINUTES_PER_DAY};

/// Stored when the caller gives no reason.
pub const NO_REASON_PROVIDED: &str = "No reason provided";

/// Largest single delay accepted.
pub const MAX_DELAY_MINUTES: u32 = MINUTES_PER_DAY as u32;

/// Field values after a delay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayApplied {
    pub new_time: TimeOfDay,
    pub original_time: TimeOfDay,
    pub is_late: bool,
    pub delay_reason: String,
}

impl DelayApplied {
    pub fn into_patch(self, actor: &Actor) -> AppointmentPatch {
        AppointmentPatch {
            time: Some(AppointmentTime::At(self.new_time)),
            original_time: Some(Some(self.original_time)),
            is_late: Some(self.is_late),
            delay_reason: Some(Some(self.delay_reason)),
            ..AppointmentPatch::by(actor)
        }
    }
}

/// Field values after reverting a delay. `delay_reason` is left as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayReverted {
    pub time: TimeOfDay,
}

impl DelayReverted {
    pub fn into_patch(self, actor: &Actor) -> AppointmentPatch {
        AppointmentPatch {
            time: Some(AppointmentTime::At(self.time)),
            is_late: Some(false),
            original_time: Some(None),
            ..AppointmentPatch::by(actor)
        }
    }
}

/// Push the appointment back by `minutes`, wrapping past midnight.
///
/// The first delay records the booked time as `original_time`; later delays
/// carry it forward so a revert always lands on the first booked time.
pub fn apply_delay(
    appt: &Appointment,
    minutes: u32,
    reason: &str,
) -> Result<DelayApplied, SchedulingError> {
    let AppointmentTime::At(current) = appt.time else {
        return Err(SchedulingError::validation(
            "On-call appointments have no time to delay",
        ));
    };
    if minutes == 0 || minutes > MAX_DELAY_MINUTES {
        return Err(SchedulingError::validation(format!(
            "Delay must be between 1 and {MAX_DELAY_MINUTES} minutes"
        )));
    }

    let original_time = match (appt.is_late, appt.original_time) {
        (true, Some(first)) => first,
        _ => current,
    };

    let reason = reason.trim();
    let delay_reason = if reason.is_empty() {
        NO_REASON_PROVIDED.to_string()
    } else {
        reason.to_string()
    };

    Ok(DelayApplied {
        new_time: current.add_minutes_wrapping(minutes),
        original_time,
        is_late: true,
        delay_reason,
    })
}

/// Restore the first booked time and clear the late flag.
pub fn revert_delay(appt: &Appointment) -> Result<DelayReverted, SchedulingError> {
    let time = appt.original_time.ok_or_else(|| {
        SchedulingError::validation("Appointment has no recorded original time to revert to")
    })?;
    Ok(DelayReverted { time })
}
