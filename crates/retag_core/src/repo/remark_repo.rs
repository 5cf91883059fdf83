//! Editorial remark persistence. Remarks are append-only.

use crate::model::edition::EditionId;
use crate::model::remark::{EditorialRemark, RemarkId, UserId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection};

/// Repository interface for the editorial audit trail.
pub trait RemarkRepository {
    fn add_remark(&self, edition_id: EditionId, author_id: UserId, body: &str)
        -> RepoResult<RemarkId>;
    /// Remarks on one edition, oldest first.
    fn remarks_for_edition(&self, edition_id: EditionId) -> RepoResult<Vec<EditorialRemark>>;
}

/// SQLite-backed remark repository.
pub struct SqliteRemarkRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRemarkRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RemarkRepository for SqliteRemarkRepository<'_> {
    fn add_remark(
        &self,
        edition_id: EditionId,
        author_id: UserId,
        body: &str,
    ) -> RepoResult<RemarkId> {
        if body.trim().is_empty() {
            return Err(RepoError::InvalidData("remark body cannot be blank".to_string()));
        }
        self.conn.execute(
            "INSERT INTO editorial_remarks (edition_id, author_id, body) VALUES (?1, ?2, ?3);",
            params![edition_id, author_id, body],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn remarks_for_edition(&self, edition_id: EditionId) -> RepoResult<Vec<EditorialRemark>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, edition_id, author_id, body, created_at
             FROM editorial_remarks
             WHERE edition_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([edition_id])?;
        let mut remarks = Vec::new();
        while let Some(row) = rows.next()? {
            remarks.push(EditorialRemark {
                id: row.get("id")?,
                edition_id: row.get("edition_id")?,
                author_id: row.get("author_id")?,
                body: row.get("body")?,
                created_at: row.get("created_at")?,
            });
        }
        Ok(remarks)
    }
}
