//! SQLite backing for `SqliteKvStore`.
//!
//! # Responsibility
//! - Open the habit database file (creating its directory) or an in-memory one.
//! - Bring the `kv_entries` schema up to date before any blob is touched.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A database stamped by a newer build is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or migrating the habit database.
#[derive(Debug)]
pub enum DbError {
    /// Parent directory of the database file could not be created.
    CreateDir { path: PathBuf, source: io::Error },
    Sqlite(rusqlite::Error),
    /// File was written by a build with a newer schema.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Whether the file belongs to a newer build and must be left untouched.
    pub fn is_schema_too_new(&self) -> bool {
        matches!(self, Self::UnsupportedSchemaVersion { .. })
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDir { path, source } => write!(
                f,
                "cannot create habit database directory {}: {source}",
                path.display()
            ),
            Self::Sqlite(err) => write!(f, "habit database error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "habit database schema v{db_version} is newer than this build (v{latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
