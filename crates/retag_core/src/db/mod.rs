//! Retag store bootstrap: connections and schema upgrades.
//!
//! # Invariants
//! - The store's schema revision lives in `PRAGMA user_version`.
//! - Writable opens upgrade the schema before any tagging is read.
//! - Read-only opens never upgrade; they refuse a store whose revision differs.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_read_only};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Store written by a newer `retag` build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Store needs upgrading but was opened read-only.
    SchemaOutdated { db_version: u32, required: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "retag store error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "retag store is at schema revision {db_version}, this build only understands up to {latest_supported}"
            ),
            Self::SchemaOutdated {
                db_version,
                required,
            } => write!(
                f,
                "retag store is at schema revision {db_version} but {required} is required; run once without --dry-run to upgrade it"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
