#![allow(dead_code)]

use retag_core::{
    DocumentId, DownstreamError, Edition, EditionId, EditionRepository, EditionState,
    LegacyRegistry, NewEdition, PublicationRegistrar, PublishOptions, PublishQueue,
    RegisterableEdition, RetagOrchestrator, RetagStores, RunReport, SearchIndex,
    SqliteEditionRepository, SqliteRemarkRepository, SqliteTaggingRepository,
    SqliteUserRepository, SubstitutionInstruction, TaggingRepository, User, UserRepository,
    DEFAULT_AUDIT_AUTHOR_EMAIL,
};
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashSet;

pub const LEGACY: &str = "legacy";
pub const QUEUE: &str = "queue";
pub const SEARCH: &str = "search";

pub fn seed_author(conn: &Connection) -> User {
    let users = SqliteUserRepository::new(conn);
    users
        .create_user(DEFAULT_AUDIT_AUTHOR_EMAIL, "GDS Inside Government Team")
        .unwrap();
    users
        .find_user_by_email(DEFAULT_AUDIT_AUTHOR_EMAIL)
        .unwrap()
        .unwrap()
}

pub fn seed_document(conn: &Connection, slug: &str) -> DocumentId {
    SqliteEditionRepository::new(conn)
        .create_document(slug)
        .unwrap()
}

pub fn seed_edition(
    conn: &Connection,
    document_id: DocumentId,
    state: EditionState,
    tags: &[&str],
) -> EditionId {
    let editions = SqliteEditionRepository::new(conn);
    let taggings = SqliteTaggingRepository::new(conn);
    let edition_id = editions
        .create_edition(&NewEdition {
            document_id,
            edition_type: "DetailedGuide".to_string(),
            state,
            title: format!("Edition of document {document_id}"),
        })
        .unwrap();
    for tag in tags {
        taggings.create_tagging(edition_id, tag).unwrap();
    }
    edition_id
}

/// Document with a single edition in `state`.
pub fn seed_item(conn: &Connection, slug: &str, state: EditionState, tags: &[&str]) -> EditionId {
    let document_id = seed_document(conn, slug);
    seed_edition(conn, document_id, state, tags)
}

pub fn topics(conn: &Connection, edition_id: EditionId) -> Vec<String> {
    SqliteTaggingRepository::new(conn)
        .topics_for_edition(edition_id)
        .unwrap()
}

pub fn remark_bodies(conn: &Connection, edition_id: EditionId) -> Vec<String> {
    use retag_core::RemarkRepository;
    SqliteRemarkRepository::new(conn)
        .remarks_for_edition(edition_id)
        .unwrap()
        .into_iter()
        .map(|remark| remark.body)
        .collect()
}

/// Records every downstream call; optionally fails selected editions.
#[derive(Default)]
pub struct RecordingDownstream {
    pub calls: RefCell<Vec<(&'static str, EditionId)>>,
    pub queued: RefCell<Vec<(String, EditionId, PublishOptions)>>,
    pub fail_legacy_for: HashSet<EditionId>,
    pub fail_search_for: HashSet<EditionId>,
}

impl RecordingDownstream {
    pub fn failing_legacy(ids: &[EditionId]) -> Self {
        Self {
            fail_legacy_for: ids.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn failing_search(ids: &[EditionId]) -> Self {
        Self {
            fail_search_for: ids.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn calls_for(&self, edition_id: EditionId) -> Vec<&'static str> {
        self.calls
            .borrow()
            .iter()
            .filter(|(_, id)| *id == edition_id)
            .map(|(system, _)| *system)
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl LegacyRegistry for RecordingDownstream {
    fn register(&self, edition: &RegisterableEdition) -> Result<(), DownstreamError> {
        self.calls.borrow_mut().push((LEGACY, edition.edition_id));
        if self.fail_legacy_for.contains(&edition.edition_id) {
            return Err(DownstreamError::new("legacy_registry", "503 service unavailable"));
        }
        Ok(())
    }
}

impl PublishQueue for RecordingDownstream {
    fn enqueue(&self, item_type: &str, item_id: EditionId, options: &PublishOptions) {
        self.calls.borrow_mut().push((QUEUE, item_id));
        self.queued
            .borrow_mut()
            .push((item_type.to_string(), item_id, *options));
    }
}

impl SearchIndex for RecordingDownstream {
    fn index(&self, edition: &Edition) -> Result<(), DownstreamError> {
        self.calls.borrow_mut().push((SEARCH, edition.id));
        if self.fail_search_for.contains(&edition.id) {
            return Err(DownstreamError::new("search_index", "index unavailable"));
        }
        Ok(())
    }
}

pub fn run_with(
    conn: &Connection,
    downstream: &RecordingDownstream,
    author: User,
    instructions: &[SubstitutionInstruction],
    dry_run: bool,
) -> RunReport {
    let taggings = SqliteTaggingRepository::new(conn);
    let editions = SqliteEditionRepository::new(conn);
    let remarks = SqliteRemarkRepository::new(conn);
    let stores = RetagStores {
        taggings: &taggings,
        editions: &editions,
        remarks: &remarks,
    };
    let registrar = PublicationRegistrar::new(downstream, downstream, downstream);
    RetagOrchestrator::new(stores, registrar, author)
        .with_dry_run(dry_run)
        .run(instructions)
        .unwrap()
}

pub fn run(
    conn: &Connection,
    downstream: &RecordingDownstream,
    author: User,
    instructions: &[SubstitutionInstruction],
) -> RunReport {
    run_with(conn, downstream, author, instructions, false)
}
