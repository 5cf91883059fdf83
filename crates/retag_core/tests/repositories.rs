mod common;

use common::{seed_author, seed_document, seed_edition, seed_item};
use retag_core::db::open_db_in_memory;
use retag_core::{
    EditionRepository, EditionState, RemarkRepository, RepoError, SqliteEditionRepository,
    SqliteRemarkRepository, SqliteTaggingRepository, TaggingRepository,
};

#[test]
fn taggings_for_topic_are_ordered_by_id() {
    let conn = open_db_in_memory().unwrap();
    let second_owner = seed_item(&conn, "b", EditionState::Draft, &["T0"]);
    let first_owner = seed_item(&conn, "a", EditionState::Draft, &["T1"]);
    let taggings = SqliteTaggingRepository::new(&conn);
    taggings.create_tagging(second_owner, "T1").unwrap();

    let found = taggings.taggings_for_topic("T1").unwrap();

    assert_eq!(found.len(), 2);
    assert!(found[0].id < found[1].id);
    assert_eq!(found[0].edition_id, first_owner);
    assert_eq!(found[1].edition_id, second_owner);
}

#[test]
fn retag_and_delete_report_missing_rows() {
    let conn = open_db_in_memory().unwrap();
    let taggings = SqliteTaggingRepository::new(&conn);

    assert!(matches!(
        taggings.retag(42, "T2").unwrap_err(),
        RepoError::NotFound { entity: "tagging", id: 42 }
    ));
    assert!(matches!(
        taggings.delete_tagging(42).unwrap_err(),
        RepoError::NotFound { .. }
    ));
}

#[test]
fn retag_validates_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let edition = seed_item(&conn, "doc", EditionState::Draft, &["T1"]);
    let taggings = SqliteTaggingRepository::new(&conn);
    let tagging = taggings.taggings_for_topic("T1").unwrap().remove(0);

    let err = taggings.retag(tagging.id, "").unwrap_err();

    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(taggings.topics_for_edition(edition).unwrap(), vec!["T1"]);
}

#[test]
fn get_edition_hides_soft_deleted_rows_and_loads_topics() {
    let conn = open_db_in_memory().unwrap();
    let live = seed_item(&conn, "live", EditionState::Archived, &["T1", "T2"]);
    let deleted = seed_item(&conn, "gone", EditionState::Deleted, &["T1"]);
    let editions = SqliteEditionRepository::new(&conn);

    let loaded = editions.get_edition(live).unwrap().unwrap();
    assert_eq!(loaded.slug, "live");
    assert_eq!(loaded.state, EditionState::Archived);
    assert!(loaded.is_frozen());
    assert_eq!(loaded.specialist_sector_tags, vec!["T1", "T2"]);

    assert!(editions.get_edition(deleted).unwrap().is_none());
}

#[test]
fn latest_published_edition_picks_newest_published_row() {
    let conn = open_db_in_memory().unwrap();
    let document = seed_document(&conn, "licensing");
    seed_edition(&conn, document, EditionState::Superseded, &[]);
    seed_edition(&conn, document, EditionState::Published, &[]);
    let newest = seed_edition(&conn, document, EditionState::Published, &[]);
    seed_edition(&conn, document, EditionState::Draft, &[]);
    let editions = SqliteEditionRepository::new(&conn);

    let latest = editions.latest_published_edition(document).unwrap().unwrap();
    assert_eq!(latest.id, newest);

    let unpublished = seed_document(&conn, "draft-only");
    seed_edition(&conn, unpublished, EditionState::Draft, &[]);
    assert!(editions
        .latest_published_edition(unpublished)
        .unwrap()
        .is_none());
}

#[test]
fn remarks_are_listed_oldest_first() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_author(&conn);
    let edition = seed_item(&conn, "audited", EditionState::Draft, &[]);
    let remarks = SqliteRemarkRepository::new(&conn);

    remarks.add_remark(edition, author.id, "first").unwrap();
    remarks.add_remark(edition, author.id, "second").unwrap();
    assert!(remarks.add_remark(edition, author.id, "  ").is_err());

    let bodies: Vec<String> = remarks
        .remarks_for_edition(edition)
        .unwrap()
        .into_iter()
        .map(|remark| remark.body)
        .collect();
    assert_eq!(bodies, vec!["first", "second"]);
}
