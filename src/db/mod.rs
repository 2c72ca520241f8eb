pub mod sqlite;
pub mod repository;

pub use sqlite::*;
pub use repository::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatabaseError {
    /// Write rejected by a CHECK/NOT NULL/UNIQUE constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }

    /// Stored data that cannot be decoded into a model value.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(
            self,
            DatabaseError::InvalidEnum { .. }
                | DatabaseError::Sqlite(rusqlite::Error::FromSqlConversionFailure(..))
                | DatabaseError::Sqlite(rusqlite::Error::InvalidColumnType(..))
        )
    }
}
