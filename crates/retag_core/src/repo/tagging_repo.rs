//! Tagging repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Query `specialist_sectors` rows by topic and by owning edition.
//! - Rewrite or delete single rows; each call is its own atomic unit.
//!
//! # Invariants
//! - Query order is ascending row id, so repeated resolves are stable.
//! - `retag` validates the destination topic before touching storage.

use crate::model::edition::EditionId;
use crate::model::tagging::{validate_tag, Tagging, TaggingId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const TAGGING_SELECT_SQL: &str = "SELECT id, edition_id, tag FROM specialist_sectors";

/// Repository interface for tagging rows.
pub trait TaggingRepository {
    /// Inserts one tagging row and returns its id.
    fn create_tagging(&self, edition_id: EditionId, tag: &str) -> RepoResult<TaggingId>;
    /// Every tagging pointing at `topic_id`, ordered by id.
    fn taggings_for_topic(&self, topic_id: &str) -> RepoResult<Vec<Tagging>>;
    /// Topic ids currently attached to one edition, ordered by tagging id.
    fn topics_for_edition(&self, edition_id: EditionId) -> RepoResult<Vec<String>>;
    /// Points an existing tagging at `topic_id`.
    fn retag(&self, id: TaggingId, topic_id: &str) -> RepoResult<()>;
    fn delete_tagging(&self, id: TaggingId) -> RepoResult<()>;
}

/// SQLite-backed tagging repository.
pub struct SqliteTaggingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaggingRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaggingRepository for SqliteTaggingRepository<'_> {
    fn create_tagging(&self, edition_id: EditionId, tag: &str) -> RepoResult<TaggingId> {
        validate_tag(tag)?;
        self.conn.execute(
            "INSERT INTO specialist_sectors (edition_id, tag) VALUES (?1, ?2);",
            params![edition_id, tag],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn taggings_for_topic(&self, topic_id: &str) -> RepoResult<Vec<Tagging>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TAGGING_SELECT_SQL} WHERE tag = ?1 ORDER BY id ASC;"))?;
        let mut rows = stmt.query([topic_id])?;
        let mut taggings = Vec::new();
        while let Some(row) = rows.next()? {
            taggings.push(parse_tagging_row(row)?);
        }
        Ok(taggings)
    }

    fn topics_for_edition(&self, edition_id: EditionId) -> RepoResult<Vec<String>> {
        load_sector_tags(self.conn, edition_id)
    }

    fn retag(&self, id: TaggingId, topic_id: &str) -> RepoResult<()> {
        validate_tag(topic_id)?;
        let changed = self.conn.execute(
            "UPDATE specialist_sectors
             SET
                tag = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, topic_id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "tagging",
                id,
            });
        }
        Ok(())
    }

    fn delete_tagging(&self, id: TaggingId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM specialist_sectors WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "tagging",
                id,
            });
        }
        Ok(())
    }
}

/// Loads topic ids attached to `edition_id`, shared with edition reads.
pub(crate) fn load_sector_tags(conn: &Connection, edition_id: EditionId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT tag
         FROM specialist_sectors
         WHERE edition_id = ?1
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([edition_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

fn parse_tagging_row(row: &Row<'_>) -> RepoResult<Tagging> {
    let tagging = Tagging {
        id: row.get("id")?,
        edition_id: row.get("edition_id")?,
        tag: row.get("tag")?,
    };
    tagging.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "specialist_sectors row {} has invalid tag: {err}",
            tagging.id
        ))
    })?;
    Ok(tagging)
}
