//! Appointment endpoints.
//!
//! Handlers are the engine's callers: they open a connection, run one engine
//! operation with the request's `Actor`, and record an activity entry once
//! the change has been written.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use rusqlite::Connection;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{
    describe_slot, ApiContext, LateRequest, ListQuery, RescheduleRequest, StatusRequest,
    UpcomingQuery,
};
use crate::db;
use crate::models::{
    format_calendar_date, local_today, ActivityEntry, Actor, Appointment, AppointmentEdit,
    AppointmentStatus, NewAppointment,
};
use crate::scheduling::{
    BookingOutcome, EditOutcome, SchedulingEngine, SqliteAppointmentStore, StatusOutcome,
};

fn engine(conn: &Connection) -> SchedulingEngine<SqliteAppointmentStore<'_>> {
    SchedulingEngine::new(SqliteAppointmentStore::new(conn))
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

#[derive(Serialize)]
pub struct UpcomingResponse {
    pub from: String,
    pub days: u32,
    pub appointments: Vec<Appointment>,
}

#[derive(Serialize)]
pub struct ActivityResponse {
    pub entries: Vec<ActivityEntry>,
}

/// `POST /api/appointments`: book an appointment.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<NewAppointment>,
) -> Result<(StatusCode, Json<BookingOutcome>), ApiError> {
    let conn = ctx.core.open_db()?;
    let outcome = engine(&conn).create_appointment(input, &actor)?;

    let appt = &outcome.appointment;
    let mut message = format!(
        "Booked {} for {}",
        appt.patient_name,
        describe_slot(&appt.date, &appt.time)
    );
    if appt.is_follow_up {
        message.push_str(" (follow-up)");
    }
    if let Some(conflict) = &outcome.conflict {
        message.push_str(&format!(", overlapping {}", conflict.patient_name));
    }
    ctx.core
        .record_activity(&conn, &actor, "created", Some(&outcome.id), &message);

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// `GET /api/appointments?date=` or `?from=&to=&status=`.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let statuses = query.statuses().map_err(ApiError::Validation)?;
    let conn = ctx.core.open_db()?;
    let engine = engine(&conn);

    let appointments = match (&query.date, &query.from, &query.to) {
        (Some(date), None, None) => {
            let mut all = engine.appointments_on(date)?;
            if !statuses.is_empty() {
                all.retain(|a| statuses.contains(&a.status));
            }
            all
        }
        (None, Some(from), Some(to)) => engine.appointments_between(from, to, &statuses)?,
        _ => {
            return Err(ApiError::Validation(
                "Provide either date, or both from and to".into(),
            ))
        }
    };

    Ok(Json(AppointmentsResponse { appointments }))
}

/// `GET /api/appointments/upcoming?days=`: active appointments from today.
pub async fn upcoming(
    State(ctx): State<ApiContext>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<UpcomingResponse>, ApiError> {
    let days = query.days.unwrap_or_else(|| ctx.core.upcoming_days());
    let today = local_today();
    let conn = ctx.core.open_db()?;
    let appointments = engine(&conn).upcoming(today, days)?;

    Ok(Json(UpcomingResponse {
        from: format_calendar_date(today),
        days,
        appointments,
    }))
}

/// `GET /api/appointments/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(engine(&conn).get_appointment(&id)?))
}

/// `PUT /api/appointments/:id`: edit details, possibly including the slot.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(edit): Json<AppointmentEdit>,
) -> Result<Json<EditOutcome>, ApiError> {
    let conn = ctx.core.open_db()?;
    let outcome = engine(&conn).update_details(&id, edit, &actor)?;

    let appt = &outcome.appointment;
    let message = format!(
        "Updated {} ({})",
        appt.patient_name,
        describe_slot(&appt.date, &appt.time)
    );
    ctx.core
        .record_activity(&conn, &actor, "updated", Some(&id), &message);

    Ok(Json(outcome))
}

/// `POST /api/appointments/:id/reschedule`
pub async fn reschedule(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(req): Json<RescheduleRequest>,
) -> Result<Json<EditOutcome>, ApiError> {
    let conn = ctx.core.open_db()?;
    let outcome = engine(&conn).reschedule(&id, &req.date, &req.time, &actor)?;

    let appt = &outcome.appointment;
    let message = format!(
        "Rescheduled {} to {}",
        appt.patient_name,
        describe_slot(&appt.date, &appt.time)
    );
    ctx.core
        .record_activity(&conn, &actor, "rescheduled", Some(&id), &message);

    Ok(Json(outcome))
}

/// `POST /api/appointments/:id/status`
pub async fn change_status(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<StatusOutcome>, ApiError> {
    let status = req
        .status
        .trim()
        .parse::<AppointmentStatus>()
        .map_err(|_| ApiError::Validation(format!("Unknown status '{}'", req.status)))?;

    let conn = ctx.core.open_db()?;
    let outcome = engine(&conn).change_status(&id, status, &actor)?;

    let message = format!(
        "Marked {} as {}",
        outcome.appointment.patient_name, status
    );
    ctx.core
        .record_activity(&conn, &actor, "status_changed", Some(&id), &message);

    Ok(Json(outcome))
}

/// `POST /api/appointments/:id/late`: delay by `minutes`.
pub async fn mark_late(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(req): Json<LateRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.core.open_db()?;
    let appt = engine(&conn).mark_late(&id, req.minutes, &req.reason, &actor)?;

    let message = format!(
        "{} running {} min late, now at {}: {}",
        appt.patient_name,
        req.minutes,
        appt.time,
        appt.delay_reason.as_deref().unwrap_or_default()
    );
    ctx.core
        .record_activity(&conn, &actor, "marked_late", Some(&id), &message);

    Ok(Json(appt))
}

/// `DELETE /api/appointments/:id/late`: back to the original time.
pub async fn revert_late(
    State(ctx): State<ApiContext>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.core.open_db()?;
    let appt = engine(&conn).revert_late(&id, &actor)?;

    let message = format!("{} back on time at {}", appt.patient_name, appt.time);
    ctx.core
        .record_activity(&conn, &actor, "late_reverted", Some(&id), &message);

    Ok(Json(appt))
}

/// `GET /api/appointments/:id/follow-up`: pre-filled booking form.
pub async fn follow_up(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<NewAppointment>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(engine(&conn).follow_up_draft(&id)?))
}

/// `GET /api/appointments/:id/activity`: history of one appointment.
pub async fn activity(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    engine(&conn).get_appointment(&id)?;
    let entries = db::activity_for_appointment(&conn, &id)?;
    Ok(Json(ActivityResponse { entries }))
}
