//! Ordered schema revisions for the retag store.
//!
//! Revision 1 holds editions and their `specialist_sectors` taggings,
//! revision 2 the editorial remark trail, revision 3 the downstream outbox.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// (revision, DDL) pairs; revisions are contiguous from 1.
const SCHEMA_REVISIONS: &[(u32, &str)] = &[
    (1, include_str!("0001_editions_and_taggings.sql")),
    (2, include_str!("0002_editorial_remarks.sql")),
    (3, include_str!("0003_downstream_outbox.sql")),
];

/// Schema revision this build writes and expects.
pub fn latest_version() -> u32 {
    SCHEMA_REVISIONS.last().map_or(0, |(revision, _)| *revision)
}

/// Revision recorded in the store.
pub fn schema_revision(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Brings the store up to [`latest_version`] in a single transaction.
///
/// A store already at the latest revision is left untouched; one ahead of it
/// is rejected rather than downgraded.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_revision(conn)?;
    let to = latest_version();
    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }
    if from == to {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (revision, ddl) in SCHEMA_REVISIONS
        .iter()
        .filter(|(revision, _)| *revision > from)
    {
        tx.execute_batch(ddl)?;
        tx.pragma_update(None, "user_version", revision)?;
    }
    tx.commit()?;

    info!("event=schema_upgrade module=db status=ok from={from} to={to}");
    Ok(())
}

/// Fails unless the store is exactly at [`latest_version`].
pub fn require_current(conn: &Connection) -> DbResult<()> {
    let revision = schema_revision(conn)?;
    let latest = latest_version();
    if revision > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: revision,
            latest_supported: latest,
        });
    }
    if revision < latest {
        return Err(DbError::SchemaOutdated {
            db_version: revision,
            required: latest,
        });
    }
    Ok(())
}
