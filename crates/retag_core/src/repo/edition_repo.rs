//! Edition repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read editions with their current topic set.
//! - Resolve the latest published edition of a document lineage.
//!
//! # Invariants
//! - Soft-deleted editions (`state='deleted'`) are reported as absent.
//! - Reads always reflect committed tagging rows; nothing is cached.

use crate::model::edition::{DocumentId, Edition, EditionId, EditionState};
use crate::repo::tagging_repo::load_sector_tags;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const EDITION_SELECT_SQL: &str = "SELECT
    e.id,
    e.document_id,
    d.slug,
    e.edition_type,
    e.state,
    e.title
FROM editions e
INNER JOIN documents d ON d.id = e.document_id";

/// Insert model for seeding editions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEdition {
    pub document_id: DocumentId,
    pub edition_type: String,
    pub state: EditionState,
    pub title: String,
}

/// Repository interface for editions and their document lineage.
pub trait EditionRepository {
    fn create_document(&self, slug: &str) -> RepoResult<DocumentId>;
    fn create_edition(&self, edition: &NewEdition) -> RepoResult<EditionId>;
    fn set_edition_state(&self, id: EditionId, state: EditionState) -> RepoResult<()>;
    /// Gets one live edition; `None` when missing or soft-deleted.
    fn get_edition(&self, id: EditionId) -> RepoResult<Option<Edition>>;
    /// Most recent `published` edition of the document, if any.
    fn latest_published_edition(&self, document_id: DocumentId) -> RepoResult<Option<Edition>>;
}

/// SQLite-backed edition repository.
pub struct SqliteEditionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEditionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, sql: &str, id: i64) -> RepoResult<Option<Edition>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_edition_row(self.conn, row)?));
        }
        Ok(None)
    }
}

impl EditionRepository for SqliteEditionRepository<'_> {
    fn create_document(&self, slug: &str) -> RepoResult<DocumentId> {
        if slug.trim().is_empty() {
            return Err(RepoError::InvalidData("document slug cannot be blank".to_string()));
        }
        self.conn
            .execute("INSERT INTO documents (slug) VALUES (?1);", [slug])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn create_edition(&self, edition: &NewEdition) -> RepoResult<EditionId> {
        self.conn.execute(
            "INSERT INTO editions (document_id, edition_type, state, title)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                edition.document_id,
                edition.edition_type.as_str(),
                edition.state.as_str(),
                edition.title.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn set_edition_state(&self, id: EditionId, state: EditionState) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE editions
             SET
                state = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, state.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "edition",
                id,
            });
        }
        Ok(())
    }

    fn get_edition(&self, id: EditionId) -> RepoResult<Option<Edition>> {
        self.query_one(
            &format!("{EDITION_SELECT_SQL} WHERE e.id = ?1 AND e.state <> 'deleted';"),
            id,
        )
    }

    fn latest_published_edition(&self, document_id: DocumentId) -> RepoResult<Option<Edition>> {
        self.query_one(
            &format!(
                "{EDITION_SELECT_SQL}
                 WHERE e.document_id = ?1
                   AND e.state = 'published'
                 ORDER BY e.id DESC
                 LIMIT 1;"
            ),
            document_id,
        )
    }
}

fn parse_edition_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Edition> {
    let id: EditionId = row.get("id")?;
    let state_text: String = row.get("state")?;
    let state = EditionState::parse(&state_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid edition state `{state_text}` in editions.state"))
    })?;

    Ok(Edition {
        id,
        document_id: row.get("document_id")?,
        slug: row.get("slug")?,
        edition_type: row.get("edition_type")?,
        state,
        title: row.get("title")?,
        specialist_sector_tags: load_sector_tags(conn, id)?,
    })
}
