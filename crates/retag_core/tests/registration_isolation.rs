mod common;

use common::{
    run, seed_author, seed_document, seed_edition, seed_item, RecordingDownstream, LEGACY, QUEUE,
    SEARCH,
};
use retag_core::downstream::outbox::{
    LEGACY_REGISTRY_CHANNEL, PUBLISHING_QUEUE_CHANNEL, SEARCH_INDEX_CHANNEL,
};
use retag_core::db::open_db_in_memory;
use retag_core::{
    DocumentId, Edition, EditionId, EditionRepository, EditionState, NewEdition,
    PublicationRegistrar, RegistrationError, RepoError, RepoResult, RetagOrchestrator,
    RetagStores, SqliteEditionRepository, SqliteOutbox, SqliteRemarkRepository,
    SqliteTaggingRepository, SubstitutionInstruction, UpdateType,
};
use std::cell::Cell;

#[test]
fn legacy_failure_for_one_edition_does_not_block_later_editions() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_author(&conn);
    let x = seed_item(&conn, "x", EditionState::Published, &["T1"]);
    let y = seed_item(&conn, "y", EditionState::Published, &["T1"]);
    let z = seed_item(&conn, "z", EditionState::Published, &["T1"]);
    let downstream = RecordingDownstream::failing_legacy(&[x]);

    let report = run(
        &conn,
        &downstream,
        author,
        &[SubstitutionInstruction::new("T1", "T2")],
    );

    let instruction = &report.instructions[0];
    assert_eq!(instruction.changed, 3);
    assert_eq!(instruction.registered, vec![y, z]);
    assert_eq!(instruction.failed_registrations.len(), 1);
    assert_eq!(instruction.failed_registrations[0].0, x);
    assert_eq!(downstream.calls_for(x), vec![LEGACY]);
    assert_eq!(downstream.calls_for(y), vec![LEGACY, QUEUE, SEARCH]);
    assert_eq!(downstream.calls_for(z), vec![LEGACY, QUEUE, SEARCH]);
}

#[test]
fn search_failure_is_reported_after_queue_handoff() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_author(&conn);
    let x = seed_item(&conn, "x", EditionState::Published, &["T1"]);
    let y = seed_item(&conn, "y", EditionState::Published, &["T1"]);
    let downstream = RecordingDownstream::failing_search(&[x]);

    let report = run(
        &conn,
        &downstream,
        author,
        &[SubstitutionInstruction::new("T1", "T2")],
    );

    let instruction = &report.instructions[0];
    assert_eq!(downstream.calls_for(x), vec![LEGACY, QUEUE, SEARCH]);
    assert_eq!(instruction.registered, vec![y]);
    assert!(instruction.failed_registrations[0]
        .1
        .contains("search indexing failed"));
}

#[test]
fn editions_of_one_document_are_registered_once() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_author(&conn);
    let document = seed_document(&conn, "north-sea");
    let published = seed_edition(&conn, document, EditionState::Published, &["T1"]);
    let draft = seed_edition(&conn, document, EditionState::Draft, &["T1"]);
    let downstream = RecordingDownstream::default();

    let report = run(
        &conn,
        &downstream,
        author,
        &[SubstitutionInstruction::new("T1", "T2")],
    );

    let instruction = &report.instructions[0];
    assert_eq!(instruction.published_found, 1);
    assert_eq!(instruction.registered, vec![published]);
    assert_eq!(downstream.calls_for(published), vec![LEGACY, QUEUE, SEARCH]);
    assert!(downstream.calls_for(draft).is_empty());
}

#[test]
fn queue_notification_carries_type_name_and_republish_marker() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_author(&conn);
    let edition = seed_item(&conn, "fresh", EditionState::Published, &["T1"]);
    let downstream = RecordingDownstream::default();

    run(
        &conn,
        &downstream,
        author,
        &[SubstitutionInstruction::new("T1", "T2")],
    );

    let queued = downstream.queued.borrow();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].0, "DetailedGuide");
    assert_eq!(queued[0].1, edition);
    assert_eq!(queued[0].2.update_type, UpdateType::Republish);
}

#[test]
fn registrar_register_all_stops_at_first_failure() {
    let conn = open_db_in_memory().unwrap();
    let first = seed_item(&conn, "first", EditionState::Published, &[]);
    let second = seed_item(&conn, "second", EditionState::Published, &[]);
    let editions = SqliteEditionRepository::new(&conn);
    let batch = vec![
        editions.get_edition(first).unwrap().unwrap(),
        editions.get_edition(second).unwrap().unwrap(),
    ];
    let downstream = RecordingDownstream::failing_legacy(&[first]);
    let registrar = PublicationRegistrar::new(&downstream, &downstream, &downstream);

    let err = registrar.register_all(&batch).unwrap_err();

    assert!(matches!(err, RegistrationError::LegacyRegistry(_)));
    assert!(downstream.calls_for(second).is_empty());
}

#[test]
fn sqlite_outbox_records_each_downstream_channel() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_author(&conn);
    let edition = seed_item(&conn, "outboxed", EditionState::Published, &["T1"]);

    let taggings = SqliteTaggingRepository::new(&conn);
    let editions = SqliteEditionRepository::new(&conn);
    let remarks = SqliteRemarkRepository::new(&conn);
    let outbox = SqliteOutbox::new(&conn);
    let stores = RetagStores {
        taggings: &taggings,
        editions: &editions,
        remarks: &remarks,
    };
    let orchestrator = RetagOrchestrator::new(
        stores,
        PublicationRegistrar::new(&outbox, &outbox, &outbox),
        author,
    );
    let report = orchestrator
        .run(&[SubstitutionInstruction::new("T1", "T2")])
        .unwrap();
    assert_eq!(report.instructions[0].registered, vec![edition]);

    let legacy = outbox.pending(LEGACY_REGISTRY_CHANNEL).unwrap();
    assert_eq!(legacy.len(), 1);
    assert_eq!(legacy[0].item_type, "detailed_guide");
    assert!(legacy[0].payload.contains("\"T2\""));

    let queued = outbox.pending(PUBLISHING_QUEUE_CHANNEL).unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].item_id, edition);
    assert!(queued[0].payload.contains("republish"));

    let indexed = outbox.pending(SEARCH_INDEX_CHANNEL).unwrap();
    assert_eq!(indexed.len(), 1);
    assert_eq!(indexed[0].item_type, "DetailedGuide");
}

/// Delegates to SQLite but fails the nth published-edition lookup for one document.
struct FlakyPublishedLookup<'conn> {
    inner: SqliteEditionRepository<'conn>,
    document_id: DocumentId,
    fail_on_call: usize,
    calls: Cell<usize>,
}

impl EditionRepository for FlakyPublishedLookup<'_> {
    fn create_document(&self, slug: &str) -> RepoResult<DocumentId> {
        self.inner.create_document(slug)
    }

    fn create_edition(&self, edition: &NewEdition) -> RepoResult<EditionId> {
        self.inner.create_edition(edition)
    }

    fn set_edition_state(&self, id: EditionId, state: EditionState) -> RepoResult<()> {
        self.inner.set_edition_state(id, state)
    }

    fn get_edition(&self, id: EditionId) -> RepoResult<Option<Edition>> {
        self.inner.get_edition(id)
    }

    fn latest_published_edition(&self, document_id: DocumentId) -> RepoResult<Option<Edition>> {
        if document_id == self.document_id {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call == self.fail_on_call {
                return Err(RepoError::InvalidData("transient".to_string()));
            }
        }
        self.inner.latest_published_edition(document_id)
    }
}

#[test]
fn published_lookup_failure_after_mutation_is_isolated_per_edition() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_author(&conn);
    let x_document = seed_document(&conn, "x");
    let x = seed_edition(&conn, x_document, EditionState::Published, &["T1"]);
    let y = seed_item(&conn, "y", EditionState::Published, &["T1"]);
    let z = seed_item(&conn, "z", EditionState::Published, &["T9"]);
    let downstream = RecordingDownstream::default();

    let taggings = SqliteTaggingRepository::new(&conn);
    let editions = FlakyPublishedLookup {
        inner: SqliteEditionRepository::new(&conn),
        document_id: x_document,
        // first lookup counts published editions, the second picks registration targets
        fail_on_call: 2,
        calls: Cell::new(0),
    };
    let remarks = SqliteRemarkRepository::new(&conn);
    let stores = RetagStores {
        taggings: &taggings,
        editions: &editions,
        remarks: &remarks,
    };
    let orchestrator = RetagOrchestrator::new(
        stores,
        PublicationRegistrar::new(&downstream, &downstream, &downstream),
        author,
    );

    let report = orchestrator
        .run(&[
            SubstitutionInstruction::new("T1", "T2"),
            SubstitutionInstruction::new("T9", "T8"),
        ])
        .unwrap();

    let first = &report.instructions[0];
    assert_eq!(first.changed, 2);
    assert_eq!(first.registered, vec![y]);
    assert_eq!(first.failed_registrations.len(), 1);
    assert_eq!(first.failed_registrations[0].0, x);
    assert!(first.failed_registrations[0].1.contains("lookup failed"));
    assert!(downstream.calls_for(x).is_empty());
    assert_eq!(downstream.calls_for(y), vec![LEGACY, QUEUE, SEARCH]);
    assert_eq!(common::topics(&conn, x), vec!["T2".to_string()]);

    let second = &report.instructions[1];
    assert_eq!(second.changed, 1);
    assert_eq!(second.registered, vec![z]);
}
