//! Appointment Store boundary.
//!
//! The engine only ever talks to storage through `AppointmentStore`. The
//! SQLite adapter borrows a connection for the duration of one request.

use rusqlite::Connection;

use super::error::SchedulingError;
use crate::db;
use crate::models::{
    Appointment, AppointmentPatch, AppointmentStatus, AppointmentTime, NewAppointmentRecord,
};

/// Durable keyed storage of appointment records.
///
/// Dates and times cross this boundary as plain `YYYY-MM-DD` / `HH:MM` /
/// `on-call` values. Every `update` is applied atomically per record, with
/// last-writer-wins semantics between concurrent callers. An empty
/// `statuses` slice means "any status".
pub trait AppointmentStore {
    fn create(&self, record: &NewAppointmentRecord) -> Result<String, SchedulingError>;

    fn get(&self, id: &str) -> Result<Option<Appointment>, SchedulingError>;

    fn update(&self, id: &str, patch: &AppointmentPatch) -> Result<(), SchedulingError>;

    fn delete(&self, id: &str) -> Result<(), SchedulingError>;

    fn query_by_date_and_status(
        &self,
        date: &str,
        time: Option<&AppointmentTime>,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, SchedulingError>;

    /// Inclusive on both ends.
    fn query_by_date_range(
        &self,
        from: &str,
        to: &str,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, SchedulingError>;
}

impl<S: AppointmentStore + ?Sized> AppointmentStore for &S {
    fn create(&self, record: &NewAppointmentRecord) -> Result<String, SchedulingError> {
        (**self).create(record)
    }

    fn get(&self, id: &str) -> Result<Option<Appointment>, SchedulingError> {
        (**self).get(id)
    }

    fn update(&self, id: &str, patch: &AppointmentPatch) -> Result<(), SchedulingError> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: &str) -> Result<(), SchedulingError> {
        (**self).delete(id)
    }

    fn query_by_date_and_status(
        &self,
        date: &str,
        time: Option<&AppointmentTime>,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, SchedulingError> {
        (**self).query_by_date_and_status(date, time, statuses)
    }

    fn query_by_date_range(
        &self,
        from: &str,
        to: &str,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, SchedulingError> {
        (**self).query_by_date_range(from, to, statuses)
    }
}

/// SQLite-backed store over a borrowed connection.
pub struct SqliteAppointmentStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteAppointmentStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl AppointmentStore for SqliteAppointmentStore<'_> {
    fn create(&self, record: &NewAppointmentRecord) -> Result<String, SchedulingError> {
        Ok(db::insert_appointment(self.conn, record)?)
    }

    fn get(&self, id: &str) -> Result<Option<Appointment>, SchedulingError> {
        Ok(db::get_appointment(self.conn, id)?)
    }

    fn update(&self, id: &str, patch: &AppointmentPatch) -> Result<(), SchedulingError> {
        Ok(db::update_appointment(self.conn, id, patch)?)
    }

    fn delete(&self, id: &str) -> Result<(), SchedulingError> {
        Ok(db::delete_appointment(self.conn, id)?)
    }

    fn query_by_date_and_status(
        &self,
        date: &str,
        time: Option<&AppointmentTime>,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(db::query_appointments_by_date_and_status(
            self.conn, date, time, statuses,
        )?)
    }

    fn query_by_date_range(
        &self,
        from: &str,
        to: &str,
        statuses: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(db::query_appointments_by_date_range(
            self.conn, from, to, statuses,
        )?)
    }
}
