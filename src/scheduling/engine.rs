//! Scheduling engine facade.
//!
//! Each operation is a short read → decide → write sequence against the
//! store, with exactly one write per mutating call. There is no locking
//! around the sequence; concurrent writers to one appointment race and the
//! last write wins.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::conflict::{find_conflict, ConflictWarning};
use super::delay::{apply_delay, revert_delay, MAX_DELAY_MINUTES};
use super::error::SchedulingError;
use super::lifecycle::{follow_up_draft, validate_transition};
use super::store::AppointmentStore;
use crate::models::{
    format_calendar_date, now_timestamp, parse_calendar_date, Actor, Appointment, AppointmentEdit,
    AppointmentPatch, AppointmentStatus, AppointmentTime, NewAppointment, NewAppointmentRecord,
};

const MAX_NAME_LEN: usize = 200;

/// Result of booking. A conflict is advisory: the booking was still made.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOutcome {
    pub id: String,
    pub appointment: Appointment,
    pub conflict: Option<ConflictWarning>,
}

/// Result of an edit or reschedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome {
    pub appointment: Appointment,
    pub conflict: Option<ConflictWarning>,
}

/// Result of a status change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutcome {
    pub appointment: Appointment,
    pub follow_up_suggested: bool,
}

pub struct SchedulingEngine<S> {
    store: S,
}

impl<S: AppointmentStore> SchedulingEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Reads ───────────────────────────────────────────────

    pub fn get_appointment(&self, id: &str) -> Result<Appointment, SchedulingError> {
        self.store
            .get(id)?
            .ok_or_else(|| SchedulingError::NotFound(id.to_string()))
    }

    /// Every appointment on one local calendar day, any status.
    pub fn appointments_on(&self, date: &str) -> Result<Vec<Appointment>, SchedulingError> {
        let date = canonical_date(date)?;
        self.store.query_by_date_and_status(&date, None, &[])
    }

    pub fn appointments_between(
        &self,
        from: &str,
        to: &str,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let from = canonical_date(from)?;
        let to = canonical_date(to)?;
        if from > to {
            return Err(SchedulingError::validation(format!(
                "Range start {from} is after range end {to}"
            )));
        }
        self.store.query_by_date_range(&from, &to, statuses)
    }

    /// Active appointments from `today` through `today + days`.
    pub fn upcoming(&self, today: NaiveDate, days: u32) -> Result<Vec<Appointment>, SchedulingError> {
        let until = today
            .checked_add_days(Days::new(days as u64))
            .ok_or_else(|| SchedulingError::validation("Upcoming window is out of range"))?;
        self.store.query_by_date_range(
            &format_calendar_date(today),
            &format_calendar_date(until),
            AppointmentStatus::ACTIVE,
        )
    }

    pub fn follow_up_draft(&self, id: &str) -> Result<NewAppointment, SchedulingError> {
        follow_up_draft(&self.get_appointment(id)?)
    }

    // ── Writes ──────────────────────────────────────────────

    /// Book a new appointment in `scheduled` status.
    pub fn create_appointment(
        &self,
        input: NewAppointment,
        actor: &Actor,
    ) -> Result<BookingOutcome, SchedulingError> {
        let patient_name = required_name(&input.patient_name)?;
        let date = canonical_date(&input.date)?;
        let time = resolve_time(input.time.as_deref(), input.on_call)?;
        let previous_appointment_id = non_blank(input.previous_appointment_id);
        match (input.is_follow_up, &previous_appointment_id) {
            (true, None) => {
                return Err(SchedulingError::validation(
                    "Follow-up appointments must reference the previous appointment",
                ))
            }
            (false, Some(_)) => {
                return Err(SchedulingError::validation(
                    "Only follow-up appointments may reference a previous appointment",
                ))
            }
            _ => {}
        }

        let conflict = find_conflict(&self.store, &date, &time, None)?;

        let record = NewAppointmentRecord {
            patient_name,
            patient_phone: non_blank(input.patient_phone),
            date,
            time,
            doctor_id: non_blank(input.doctor_id),
            doctor_name: non_blank(input.doctor_name),
            status: AppointmentStatus::Scheduled,
            is_follow_up: input.is_follow_up,
            previous_appointment_id,
            notes: non_blank(input.notes),
            created_at: now_timestamp(),
            created_by: actor.id.clone(),
        };
        let id = self.store.create(&record)?;

        if let Some(existing) = &conflict {
            warn!(
                appointment_id = %id,
                conflicting_id = %existing.id,
                date = %record.date,
                time = %record.time,
                "Booked into an occupied slot"
            );
        }
        info!(
            appointment_id = %id,
            date = %record.date,
            time = %record.time,
            follow_up = record.is_follow_up,
            actor = %actor.id,
            "Appointment created"
        );

        Ok(BookingOutcome {
            appointment: record.into_appointment(id.clone()),
            id,
            conflict: conflict.as_ref().map(ConflictWarning::from),
        })
    }

    /// Move an appointment to a new slot. Status is unchanged.
    pub fn reschedule(
        &self,
        id: &str,
        new_date: &str,
        new_time: &str,
        actor: &Actor,
    ) -> Result<EditOutcome, SchedulingError> {
        self.update_details(
            id,
            AppointmentEdit {
                date: Some(new_date.to_string()),
                time: Some(new_time.to_string()),
                ..AppointmentEdit::default()
            },
            actor,
        )
    }

    /// Edit patient, doctor, notes, date or time of an active appointment.
    ///
    /// An edit naming a date or time re-runs the advisory conflict check
    /// (excluding this appointment), even when the slot is unchanged. A slot
    /// change also drops any late state. An edit that changes nothing is not
    /// written.
    pub fn update_details(
        &self,
        id: &str,
        edit: AppointmentEdit,
        actor: &Actor,
    ) -> Result<EditOutcome, SchedulingError> {
        let new_name = edit.patient_name.as_deref().map(required_name).transpose()?;
        let new_date = edit.date.as_deref().map(canonical_date).transpose()?;
        let new_time = edit
            .time
            .as_deref()
            .map(|raw| raw.trim().parse::<AppointmentTime>())
            .transpose()?;

        let mut appt = self.get_appointment(id)?;
        if appt.status.is_terminal() {
            return Err(SchedulingError::validation(format!(
                "Cannot edit a {} appointment",
                appt.status
            )));
        }

        let slot_requested = new_date.is_some() || new_time.is_some();
        let date = new_date.unwrap_or_else(|| appt.date.clone());
        let time = new_time.unwrap_or(appt.time);
        let slot_changed = date != appt.date || time != appt.time;

        let mut patch = AppointmentPatch::by(actor);
        patch.patient_name = new_name;
        patch.patient_phone = edit.patient_phone.map(|v| non_blank(Some(v)));
        patch.doctor_id = edit.doctor_id.map(|v| non_blank(Some(v)));
        patch.doctor_name = edit.doctor_name.map(|v| non_blank(Some(v)));
        patch.notes = edit.notes.map(|v| non_blank(Some(v)));

        let conflict = if slot_requested {
            find_conflict(&self.store, &date, &time, Some(id))?
        } else {
            None
        };
        if slot_changed {
            patch.date = Some(date.clone());
            patch.time = Some(time);
            if appt.is_late || appt.original_time.is_some() {
                patch.is_late = Some(false);
                patch.original_time = Some(None);
            }
        }

        if let Some(existing) = &conflict {
            warn!(
                appointment_id = %id,
                conflicting_id = %existing.id,
                date = %date,
                time = %time,
                "Rescheduled into an occupied slot"
            );
        }
        if patch.is_empty() {
            debug!(appointment_id = %id, "Edit changes nothing, skipping write");
            return Ok(EditOutcome {
                appointment: appt,
                conflict: conflict.as_ref().map(ConflictWarning::from),
            });
        }

        self.store.update(id, &patch)?;
        patch.apply_to(&mut appt);

        info!(
            appointment_id = %id,
            slot_changed,
            actor = %actor.id,
            "Appointment updated"
        );

        Ok(EditOutcome {
            appointment: appt,
            conflict: conflict.as_ref().map(ConflictWarning::from),
        })
    }

    /// Apply a lifecycle transition. Returns whether to offer a follow-up.
    pub fn change_status(
        &self,
        id: &str,
        new_status: AppointmentStatus,
        actor: &Actor,
    ) -> Result<StatusOutcome, SchedulingError> {
        let mut appt = self.get_appointment(id)?;
        let effect = validate_transition(appt.status, new_status)?;

        let mut patch = AppointmentPatch::by(actor);
        patch.status = Some(new_status);
        self.store.update(id, &patch)?;

        info!(
            appointment_id = %id,
            from = %appt.status,
            to = %new_status,
            follow_up_suggested = effect.follow_up_suggested,
            actor = %actor.id,
            "Appointment status changed"
        );
        patch.apply_to(&mut appt);

        Ok(StatusOutcome {
            appointment: appt,
            follow_up_suggested: effect.follow_up_suggested,
        })
    }

    /// Push an active appointment back by `minutes`.
    pub fn mark_late(
        &self,
        id: &str,
        minutes: i64,
        reason: &str,
        actor: &Actor,
    ) -> Result<Appointment, SchedulingError> {
        if minutes <= 0 || minutes > MAX_DELAY_MINUTES as i64 {
            return Err(SchedulingError::validation(format!(
                "Delay must be between 1 and {MAX_DELAY_MINUTES} minutes"
            )));
        }

        let mut appt = self.get_appointment(id)?;
        if appt.status.is_terminal() {
            return Err(SchedulingError::validation(format!(
                "Cannot delay a {} appointment",
                appt.status
            )));
        }

        let applied = apply_delay(&appt, minutes as u32, reason)?;
        debug!(
            appointment_id = %id,
            new_time = %applied.new_time,
            original_time = %applied.original_time,
            "Delay computed"
        );
        let patch = applied.into_patch(actor);
        self.store.update(id, &patch)?;
        patch.apply_to(&mut appt);

        info!(
            appointment_id = %id,
            minutes,
            time = %appt.time,
            actor = %actor.id,
            "Appointment marked late"
        );
        Ok(appt)
    }

    /// Return to the first booked time. Allowed in any status so stale late
    /// data on closed appointments can still be cleaned up.
    pub fn revert_late(&self, id: &str, actor: &Actor) -> Result<Appointment, SchedulingError> {
        let mut appt = self.get_appointment(id)?;
        let patch = revert_delay(&appt)?.into_patch(actor);
        self.store.update(id, &patch)?;
        patch.apply_to(&mut appt);

        info!(
            appointment_id = %id,
            time = %appt.time,
            status = %appt.status,
            actor = %actor.id,
            "Late status reverted"
        );
        Ok(appt)
    }
}

// ─── Input helpers ────────────────────────────────────────────────────────────

fn required_name(raw: &str) -> Result<String, SchedulingError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(SchedulingError::validation("Patient name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(SchedulingError::validation("Patient name too long"));
    }
    Ok(name.to_string())
}

fn canonical_date(raw: &str) -> Result<String, SchedulingError> {
    if raw.trim().is_empty() {
        return Err(SchedulingError::validation("Date is required"));
    }
    Ok(format_calendar_date(parse_calendar_date(raw)?))
}

/// `on_call` wins only when no concrete time contradicts it.
fn resolve_time(raw: Option<&str>, on_call: bool) -> Result<AppointmentTime, SchedulingError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    match (raw, on_call) {
        (None, true) => Ok(AppointmentTime::OnCall),
        (Some(s), true) => match s.parse::<AppointmentTime>()? {
            AppointmentTime::OnCall => Ok(AppointmentTime::OnCall),
            AppointmentTime::At(_) => Err(SchedulingError::validation(
                "An on-call appointment cannot also have a fixed time",
            )),
        },
        (Some(s), false) => Ok(s.parse::<AppointmentTime>()?),
        (None, false) => Err(SchedulingError::validation(
            "Time is required unless the appointment is on-call",
        )),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
