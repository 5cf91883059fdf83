//! SQLite outbox adapter for the downstream contracts.
//!
//! Each call appends one `downstream_outbox` row; a separate relay is
//! expected to deliver rows to the real systems.

use crate::downstream::{
    DownstreamError, LegacyRegistry, PublishOptions, PublishQueue, RegisterableEdition,
    SearchIndex,
};
use crate::model::edition::{Edition, EditionId};
use log::{debug, error};
use rusqlite::{params, Connection};
use serde::Serialize;

pub const LEGACY_REGISTRY_CHANNEL: &str = "legacy_registry";
pub const PUBLISHING_QUEUE_CHANNEL: &str = "publishing_queue";
pub const SEARCH_INDEX_CHANNEL: &str = "search_index";

/// One persisted outbox row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEntry {
    pub id: i64,
    pub channel: String,
    pub item_type: String,
    pub item_id: EditionId,
    pub payload: String,
}

pub struct SqliteOutbox<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOutbox<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Lists queued rows for one channel, oldest first.
    pub fn pending(&self, channel: &str) -> rusqlite::Result<Vec<OutboxEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, channel, item_type, item_id, payload
             FROM downstream_outbox
             WHERE channel = ?1
             ORDER BY id ASC;",
        )?;
        let rows = stmt.query_map([channel], |row| {
            Ok(OutboxEntry {
                id: row.get("id")?,
                channel: row.get("channel")?,
                item_type: row.get("item_type")?,
                item_id: row.get("item_id")?,
                payload: row.get("payload")?,
            })
        })?;
        let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn append<T: Serialize>(
        &self,
        channel: &'static str,
        item_type: &str,
        item_id: EditionId,
        payload: &T,
    ) -> Result<(), DownstreamError> {
        let payload = serde_json::to_string(payload)
            .map_err(|err| DownstreamError::new(channel, format!("payload encoding failed: {err}")))?;
        self.conn
            .execute(
                "INSERT INTO downstream_outbox (channel, item_type, item_id, payload)
                 VALUES (?1, ?2, ?3, ?4);",
                params![channel, item_type, item_id, payload],
            )
            .map_err(|err| DownstreamError::new(channel, err.to_string()))?;
        debug!("event=outbox_append module=downstream status=ok channel={channel} item_id={item_id}");
        Ok(())
    }
}

impl LegacyRegistry for SqliteOutbox<'_> {
    fn register(&self, edition: &RegisterableEdition) -> Result<(), DownstreamError> {
        self.append(
            LEGACY_REGISTRY_CHANNEL,
            edition.kind.as_str(),
            edition.edition_id,
            edition,
        )
    }
}

impl PublishQueue for SqliteOutbox<'_> {
    fn enqueue(&self, item_type: &str, item_id: EditionId, options: &PublishOptions) {
        if let Err(err) = self.append(PUBLISHING_QUEUE_CHANNEL, item_type, item_id, options) {
            error!(
                "event=publish_enqueue module=downstream status=error item_type={item_type} item_id={item_id} error={err}"
            );
        }
    }
}

impl SearchIndex for SqliteOutbox<'_> {
    fn index(&self, edition: &Edition) -> Result<(), DownstreamError> {
        self.append(
            SEARCH_INDEX_CHANNEL,
            edition.edition_type.as_str(),
            edition.id,
            edition,
        )
    }
}
