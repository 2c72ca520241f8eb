use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;
use super::time::{AppointmentTime, TimeOfDay};

/// The user performing an operation. Stamps the audit fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A stored appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    pub patient_phone: Option<String>,
    /// Local calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub time: AppointmentTime,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub status: AppointmentStatus,
    pub is_follow_up: bool,
    pub previous_appointment_id: Option<String>,
    pub is_late: bool,
    /// Time first booked, kept across successive delays.
    pub original_time: Option<TimeOfDay>,
    pub delay_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub created_by: String,
    pub updated_at: String,
    pub updated_by: String,
}

impl Appointment {
    /// Whether the delay badge and delay actions apply.
    /// Terminal appointments keep their delay fields but hide them.
    pub fn shows_delay(&self) -> bool {
        self.is_late && self.status.is_active()
    }
}

/// Field set written by the store on creation. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointmentRecord {
    pub patient_name: String,
    pub patient_phone: Option<String>,
    pub date: String,
    pub time: AppointmentTime,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub status: AppointmentStatus,
    pub is_follow_up: bool,
    pub previous_appointment_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub created_by: String,
}

impl NewAppointmentRecord {
    /// The appointment as stored right after insertion under `id`.
    pub fn into_appointment(self, id: String) -> Appointment {
        Appointment {
            id,
            patient_name: self.patient_name,
            patient_phone: self.patient_phone,
            date: self.date,
            time: self.time,
            doctor_id: self.doctor_id,
            doctor_name: self.doctor_name,
            status: self.status,
            is_follow_up: self.is_follow_up,
            previous_appointment_id: self.previous_appointment_id,
            is_late: false,
            original_time: None,
            delay_reason: None,
            notes: self.notes,
            updated_at: self.created_at.clone(),
            updated_by: self.created_by.clone(),
            created_at: self.created_at,
            created_by: self.created_by,
        }
    }
}

/// Booking request as received from a screen or API call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAppointment {
    pub patient_name: String,
    pub patient_phone: Option<String>,
    pub date: String,
    /// `HH:MM`, or `on-call`. May be omitted when `on_call` is set.
    pub time: Option<String>,
    pub on_call: bool,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub is_follow_up: bool,
    pub previous_appointment_id: Option<String>,
    pub notes: Option<String>,
}

/// Details edit. `None` leaves a field untouched; an empty string clears an
/// optional text field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentEdit {
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub date: Option<String>,
    /// `HH:MM` or `on-call`.
    pub time: Option<String>,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub notes: Option<String>,
}

/// Partial update applied by the store in a single statement.
///
/// Outer `None` leaves the column untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentPatch {
    pub patient_name: Option<String>,
    pub patient_phone: Option<Option<String>>,
    pub date: Option<String>,
    pub time: Option<AppointmentTime>,
    pub doctor_id: Option<Option<String>>,
    pub doctor_name: Option<Option<String>>,
    pub status: Option<AppointmentStatus>,
    pub is_late: Option<bool>,
    pub original_time: Option<Option<TimeOfDay>>,
    pub delay_reason: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub updated_at: String,
    pub updated_by: String,
}

impl AppointmentPatch {
    /// Empty patch stamped with the acting user and the current instant.
    pub fn by(actor: &Actor) -> Self {
        Self {
            updated_at: now_timestamp(),
            updated_by: actor.id.clone(),
            ..Default::default()
        }
    }

    /// True when nothing besides the audit stamp would change.
    pub fn is_empty(&self) -> bool {
        self.patient_name.is_none()
            && self.patient_phone.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.doctor_id.is_none()
            && self.doctor_name.is_none()
            && self.status.is_none()
            && self.is_late.is_none()
            && self.original_time.is_none()
            && self.delay_reason.is_none()
            && self.notes.is_none()
    }

    /// Apply to an in-memory snapshot, mirroring what the store writes.
    pub fn apply_to(&self, appt: &mut Appointment) {
        if let Some(v) = &self.patient_name {
            appt.patient_name = v.clone();
        }
        if let Some(v) = &self.patient_phone {
            appt.patient_phone = v.clone();
        }
        if let Some(v) = &self.date {
            appt.date = v.clone();
        }
        if let Some(v) = self.time {
            appt.time = v;
        }
        if let Some(v) = &self.doctor_id {
            appt.doctor_id = v.clone();
        }
        if let Some(v) = &self.doctor_name {
            appt.doctor_name = v.clone();
        }
        if let Some(v) = self.status {
            appt.status = v;
        }
        if let Some(v) = self.is_late {
            appt.is_late = v;
        }
        if let Some(v) = self.original_time {
            appt.original_time = v;
        }
        if let Some(v) = &self.delay_reason {
            appt.delay_reason = v.clone();
        }
        if let Some(v) = &self.notes {
            appt.notes = v.clone();
        }
        appt.updated_at = self.updated_at.clone();
        appt.updated_by = self.updated_by.clone();
    }
}

/// RFC 3339 UTC instant for audit fields.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339()
}
