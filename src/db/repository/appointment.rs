use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

const SELECT_COLUMNS: &str = "id, patient_name, patient_phone, date, time, doctor_id, doctor_name,
     status, is_follow_up, previous_appointment_id, is_late, original_time,
     delay_reason, notes, created_at, created_by, updated_at, updated_by";

/// Within a day, timed slots sort before on-call bookings. Shared slots keep
/// insertion order.
const ORDER_BY: &str =
    "ORDER BY date ASC, CASE WHEN time = 'on-call' THEN 1 ELSE 0 END, time ASC, rowid ASC";

/// Raw column values, decoded into an `Appointment` outside the row closure
/// so that bad stored values surface as `DatabaseError::InvalidEnum`.
struct AppointmentRow {
    id: String,
    patient_name: String,
    patient_phone: Option<String>,
    date: String,
    time: String,
    doctor_id: Option<String>,
    doctor_name: Option<String>,
    status: String,
    is_follow_up: bool,
    previous_appointment_id: Option<String>,
    is_late: bool,
    original_time: Option<String>,
    delay_reason: Option<String>,
    notes: Option<String>,
    created_at: String,
    created_by: String,
    updated_at: String,
    updated_by: String,
}

impl AppointmentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_name: row.get(1)?,
            patient_phone: row.get(2)?,
            date: row.get(3)?,
            time: row.get(4)?,
            doctor_id: row.get(5)?,
            doctor_name: row.get(6)?,
            status: row.get(7)?,
            is_follow_up: row.get(8)?,
            previous_appointment_id: row.get(9)?,
            is_late: row.get(10)?,
            original_time: row.get(11)?,
            delay_reason: row.get(12)?,
            notes: row.get(13)?,
            created_at: row.get(14)?,
            created_by: row.get(15)?,
            updated_at: row.get(16)?,
            updated_by: row.get(17)?,
        })
    }

    fn into_appointment(self) -> Result<Appointment, DatabaseError> {
        let time = self
            .time
            .parse::<AppointmentTime>()
            .map_err(|_| DatabaseError::InvalidEnum {
                field: "time".into(),
                value: self.time.clone(),
            })?;
        let original_time = self
            .original_time
            .map(|raw| {
                raw.parse::<TimeOfDay>().map_err(|_| DatabaseError::InvalidEnum {
                    field: "original_time".into(),
                    value: raw,
                })
            })
            .transpose()?;

        Ok(Appointment {
            id: self.id,
            patient_name: self.patient_name,
            patient_phone: self.patient_phone,
            date: self.date,
            time,
            doctor_id: self.doctor_id,
            doctor_name: self.doctor_name,
            status: self.status.parse()?,
            is_follow_up: self.is_follow_up,
            previous_appointment_id: self.previous_appointment_id,
            is_late: self.is_late,
            original_time,
            delay_reason: self.delay_reason,
            notes: self.notes,
            created_at: self.created_at,
            created_by: self.created_by,
            updated_at: self.updated_at,
            updated_by: self.updated_by,
        })
    }
}

fn text(value: &Option<String>) -> Value {
    match value {
        Some(s) => Value::Text(s.clone()),
        None => Value::Null,
    }
}

fn status_filter(statuses: &[AppointmentStatus], params: &mut Vec<Value>) -> String {
    if statuses.is_empty() {
        return String::new();
    }
    let placeholders: Vec<String> = statuses
        .iter()
        .map(|status| {
            params.push(Value::Text(status.as_str().to_string()));
            format!("?{}", params.len())
        })
        .collect();
    format!(" AND status IN ({})", placeholders.join(", "))
}

fn query_appointments(
    conn: &Connection,
    sql: &str,
    values: Vec<Value>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params_from_iter(values), AppointmentRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(AppointmentRow::into_appointment).collect()
}

/// Inserts a new appointment and returns the generated id.
pub fn insert_appointment(
    conn: &Connection,
    record: &NewAppointmentRecord,
) -> Result<String, DatabaseError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO appointments (id, patient_name, patient_phone, date, time, doctor_id,
         doctor_name, status, is_follow_up, previous_appointment_id, is_late, notes,
         created_at, created_by, updated_at, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, ?11, ?12, ?13, ?12, ?13)",
        params![
            id,
            record.patient_name,
            record.patient_phone,
            record.date,
            record.time.to_string(),
            record.doctor_id,
            record.doctor_name,
            record.status.as_str(),
            record.is_follow_up,
            record.previous_appointment_id,
            record.notes,
            record.created_at,
            record.created_by,
        ],
    )?;
    Ok(id)
}

pub fn get_appointment(conn: &Connection, id: &str) -> Result<Option<Appointment>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM appointments WHERE id = ?1"),
            params![id],
            AppointmentRow::from_row,
        )
        .optional()?;
    row.map(AppointmentRow::into_appointment).transpose()
}

/// Applies a partial update in a single statement.
pub fn update_appointment(
    conn: &Connection,
    id: &str,
    patch: &AppointmentPatch,
) -> Result<(), DatabaseError> {
    let mut sets: Vec<&'static str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(v) = &patch.patient_name {
        sets.push("patient_name");
        values.push(Value::Text(v.clone()));
    }
    if let Some(v) = &patch.patient_phone {
        sets.push("patient_phone");
        values.push(text(v));
    }
    if let Some(v) = &patch.date {
        sets.push("date");
        values.push(Value::Text(v.clone()));
    }
    if let Some(v) = patch.time {
        sets.push("time");
        values.push(Value::Text(v.to_string()));
    }
    if let Some(v) = &patch.doctor_id {
        sets.push("doctor_id");
        values.push(text(v));
    }
    if let Some(v) = &patch.doctor_name {
        sets.push("doctor_name");
        values.push(text(v));
    }
    if let Some(v) = patch.status {
        sets.push("status");
        values.push(Value::Text(v.as_str().to_string()));
    }
    if let Some(v) = patch.is_late {
        sets.push("is_late");
        values.push(Value::Integer(v as i64));
    }
    if let Some(v) = patch.original_time {
        sets.push("original_time");
        values.push(text(&v.map(|t| t.to_string())));
    }
    if let Some(v) = &patch.delay_reason {
        sets.push("delay_reason");
        values.push(text(v));
    }
    if let Some(v) = &patch.notes {
        sets.push("notes");
        values.push(text(v));
    }
    sets.push("updated_at");
    values.push(Value::Text(patch.updated_at.clone()));
    sets.push("updated_by");
    values.push(Value::Text(patch.updated_by.clone()));

    let assignments: Vec<String> = sets
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ?{}", i + 1))
        .collect();
    values.push(Value::Text(id.to_string()));
    let sql = format!(
        "UPDATE appointments SET {} WHERE id = ?{}",
        assignments.join(", "),
        values.len()
    );

    let changed = conn.execute(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.into(),
        });
    }
    Ok(())
}

pub fn delete_appointment(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.into(),
        });
    }
    Ok(())
}

/// Appointments on `date`, optionally at exactly `time`, in any of
/// `statuses` (all statuses when empty).
pub fn query_appointments_by_date_and_status(
    conn: &Connection,
    date: &str,
    time: Option<&AppointmentTime>,
    statuses: &[AppointmentStatus],
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut values = vec![Value::Text(date.to_string())];
    let mut sql = format!("SELECT {SELECT_COLUMNS} FROM appointments WHERE date = ?1");
    if let Some(time) = time {
        values.push(Value::Text(time.to_string()));
        sql.push_str(&format!(" AND time = ?{}", values.len()));
    }
    sql.push_str(&status_filter(statuses, &mut values));
    sql.push(' ');
    sql.push_str(ORDER_BY);
    query_appointments(conn, &sql, values)
}

/// Appointments with `from <= date <= to` (lexical), in any of `statuses`.
pub fn query_appointments_by_date_range(
    conn: &Connection,
    from: &str,
    to: &str,
    statuses: &[AppointmentStatus],
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut values = vec![Value::Text(from.to_string()), Value::Text(to.to_string())];
    let mut sql = format!("SELECT {SELECT_COLUMNS} FROM appointments WHERE date >= ?1 AND date <= ?2");
    sql.push_str(&status_filter(statuses, &mut values));
    sql.push(' ');
    sql.push_str(ORDER_BY);
    query_appointments(conn, &sql, values)
}
