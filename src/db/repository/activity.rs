use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::{now_timestamp, ActivityEntry, Actor};

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<ActivityEntry> {
    Ok(ActivityEntry {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        actor_id: row.get(2)?,
        actor_name: row.get(3)?,
        action: row.get(4)?,
        appointment_id: row.get(5)?,
        message: row.get(6)?,
    })
}

/// Record an activity entry stamped with the current instant.
pub fn insert_activity(
    conn: &Connection,
    actor: &Actor,
    action: &str,
    appointment_id: Option<&str>,
    message: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO activity_log (timestamp, actor_id, actor_name, action, appointment_id, message)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![now_timestamp(), actor.id, actor.name, action, appointment_id, message],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent entries first.
pub fn recent_activity(conn: &Connection, limit: u32) -> Result<Vec<ActivityEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, timestamp, actor_id, actor_name, action, appointment_id, message
         FROM activity_log
         ORDER BY timestamp DESC, id DESC
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![limit], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Full history of one appointment, oldest first.
pub fn activity_for_appointment(
    conn: &Connection,
    appointment_id: &str,
) -> Result<Vec<ActivityEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, timestamp, actor_id, actor_name, action, appointment_id, message
         FROM activity_log
         WHERE appointment_id = ?1
         ORDER BY timestamp ASC, id ASC",
    )?;
    let rows = stmt
        .query_map(params![appointment_id], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Prune entries older than the given number of days.
pub fn prune_activity(conn: &Connection, retention_days: i64) -> Result<usize, DatabaseError> {
    let cutoff = (chrono::Utc::now() - chrono::Duration::days(retention_days)).to_rfc3339();
    let deleted = conn.execute(
        "DELETE FROM activity_log WHERE timestamp < ?1",
        params![cutoff],
    )?;
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn desk() -> Actor {
        Actor::new("u-1", "Front Desk")
    }

    #[test]
    fn insert_and_list_recent() {
        let conn = open_memory_database().unwrap();
        insert_activity(&conn, &desk(), "create", Some("appt-1"), "Booked Ana Ruiz").unwrap();
        insert_activity(&conn, &desk(), "status", Some("appt-1"), "Confirmed Ana Ruiz").unwrap();
        insert_activity(&conn, &desk(), "create", Some("appt-2"), "Booked Ben Ode").unwrap();

        let recent = recent_activity(&conn, 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "Booked Ben Ode");
        assert_eq!(recent[0].actor_name, "Front Desk");
    }

    #[test]
    fn history_scoped_to_appointment() {
        let conn = open_memory_database().unwrap();
        insert_activity(&conn, &desk(), "create", Some("appt-1"), "Booked").unwrap();
        insert_activity(&conn, &desk(), "create", Some("appt-2"), "Booked other").unwrap();
        insert_activity(&conn, &desk(), "late", Some("appt-1"), "Running late").unwrap();

        let history = activity_for_appointment(&conn, "appt-1").unwrap();
        let actions: Vec<&str> = history.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["create", "late"]);
    }

    #[test]
    fn prune_keeps_recent_entries() {
        let conn = open_memory_database().unwrap();
        insert_activity(&conn, &desk(), "create", None, "Fresh").unwrap();
        conn.execute(
            "INSERT INTO activity_log (timestamp, actor_id, actor_name, action, message)
             VALUES ('2000-01-01T00:00:00+00:00', 'u-1', 'Front Desk', 'create', 'Old')",
            [],
        )
        .unwrap();

        let deleted = prune_activity(&conn, 30).unwrap();
        assert_eq!(deleted, 1);
        let remaining = recent_activity(&conn, 10).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message, "Fresh");
    }
}
