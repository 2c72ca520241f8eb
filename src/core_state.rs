//! Transport-agnostic application state.
//!
//! `CoreState` is shared by every HTTP handler behind an `Arc`. It holds no
//! connection itself: each request opens its own SQLite connection, so
//! concurrent requests never share a statement cache or transaction.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Settings;
use crate::db::{self, DatabaseError};
use crate::models::Actor;

/// Activity entries older than this are pruned at startup.
pub const ACTIVITY_RETENTION_DAYS: i64 = 365;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    settings: Settings,
    started_at: Instant,
}

impl CoreState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            started_at: Instant::now(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn db_path(&self) -> &Path {
        &self.settings.db_path
    }

    /// Look-ahead window for the upcoming list.
    pub fn upcoming_days(&self) -> u32 {
        self.settings.upcoming_days
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Open a database connection. Migrations run on every open and are
    /// no-ops once applied.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.settings.db_path).map_err(CoreError::Database)
    }

    /// Create the database file and prune old activity entries.
    pub fn prepare_storage(&self) -> Result<(), CoreError> {
        let conn = self.open_db()?;
        let pruned = db::prune_activity(&conn, ACTIVITY_RETENTION_DAYS)?;
        tracing::info!(
            db_path = %self.settings.db_path.display(),
            pruned,
            "Storage ready"
        );
        Ok(())
    }

    /// Append an activity entry. A failure here never undoes the change it
    /// describes, so it is logged and swallowed.
    pub fn record_activity(
        &self,
        conn: &rusqlite::Connection,
        actor: &Actor,
        action: &str,
        appointment_id: Option<&str>,
        message: &str,
    ) {
        if let Err(e) = db::insert_activity(conn, actor, action, appointment_id, message) {
            tracing::warn!(action, appointment_id, "Failed to record activity: {e}");
        }
    }
}

/// Default settings pointing at `db_path`, bound to an ephemeral port.
impl From<PathBuf> for CoreState {
    fn from(db_path: PathBuf) -> Self {
        Self::new(Settings {
            db_path,
            bind_addr: std::net::SocketAddr::from(([127, 0, 0, 1], 0)),
            upcoming_days: crate::config::DEFAULT_UPCOMING_DAYS,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
