//! Connection bootstrap utilities for SQLite.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections are at the latest schema revision.

use super::migrations::{apply_migrations, require_current};
use super::DbResult;
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaPolicy {
    Upgrade,
    RequireCurrent,
}

/// Opens the retagging database file and applies all pending migrations.
///
/// # Side effects
/// - Creates the file when it does not exist yet.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with("file", SchemaPolicy::Upgrade, || Connection::open(path))
}

/// Opens an in-memory database with the full schema.
///
/// Used by tests.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", SchemaPolicy::Upgrade, Connection::open_in_memory)
}

/// Opens an existing retagging database without write access.
///
/// Never creates the file or upgrades its schema; a store that is not at the
/// latest revision is rejected with [`super::DbError::SchemaOutdated`].
pub fn open_db_read_only(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    open_with("read_only", SchemaPolicy::RequireCurrent, || {
        Connection::open_with_flags(path, flags)
    })
}

fn open_with<F>(mode: &'static str, policy: SchemaPolicy, connect: F) -> DbResult<Connection>
where
    F: FnOnce() -> rusqlite::Result<Connection>,
{
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = connect().map_err(|err| {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={err}",
            started_at.elapsed().as_millis()
        );
        err
    })?;

    if let Err(err) = bootstrap_connection(&mut conn, policy) {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={err}",
            started_at.elapsed().as_millis()
        );
        return Err(err);
    }

    info!(
        "event=db_open module=db status=ok mode={mode} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn bootstrap_connection(conn: &mut Connection, policy: SchemaPolicy) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    match policy {
        SchemaPolicy::Upgrade => apply_migrations(conn),
        SchemaPolicy::RequireCurrent => require_current(conn),
    }
}
