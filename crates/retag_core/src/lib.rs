//! Bulk topic retagging for editorial content.
//!
//! Reads `remove_topic -> add_topic` substitutions, migrates every matching
//! tagging with an audit remark, then re-registers affected published
//! editions with the downstream systems of record.

pub mod change_set;
pub mod config;
pub mod db;
pub mod downstream;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{resolve_audit_author, RetagConfig, DEFAULT_AUDIT_AUTHOR_EMAIL};
pub use downstream::{
    DownstreamError, LegacyRegistry, PublishOptions, PublishQueue, RegisterableEdition,
    SearchIndex, SqliteOutbox, UpdateType,
};
pub use error::{RetagError, RetagResult};
pub use logging::{default_log_level, init_logging, init_logging_with_stdout, logging_status};
pub use model::edition::{DocumentId, Edition, EditionId, EditionState};
pub use model::instruction::SubstitutionInstruction;
pub use model::remark::{EditorialRemark, User};
pub use model::tagging::{Tagging, TaggingAction, TaggingClassification};
pub use repo::edition_repo::{EditionRepository, NewEdition, SqliteEditionRepository};
pub use repo::remark_repo::{RemarkRepository, SqliteRemarkRepository};
pub use repo::tagging_repo::{SqliteTaggingRepository, TaggingRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::mutator::{MutationError, MutationOutcome, RemarkDisposition, TaggingMutator};
pub use service::orchestrator::{
    InstructionReport, ReconciliationPhase, RetagOrchestrator, RetagStores, RunReport,
};
pub use service::registrar::{PublicationRegistrar, RegistrationError};
pub use service::resolver::{classify, AffectedTagging, ResolvedTaggings, TaggingResolver};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
