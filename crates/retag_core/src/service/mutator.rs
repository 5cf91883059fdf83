//! Applies one tagging migration and records the editorial audit remark.
//!
//! # Responsibility
//! - Delete (conflict) or rewrite (simple change) a single tagging row.
//! - Attribute a remark to the configured audit author unless the owning
//!   edition is missing or frozen.
//!
//! # Invariants
//! - The owner is re-read before classification, so earlier mutations in the
//!   same instruction are visible.
//! - At most one remark is written per applied mutation.

use crate::model::edition::{Edition, EditionId};
use crate::model::instruction::SubstitutionInstruction;
use crate::model::remark::{retagging_remark_body, RemarkId, User};
use crate::model::tagging::{Tagging, TaggingAction, TaggingClassification, TaggingId};
use crate::repo::edition_repo::EditionRepository;
use crate::repo::remark_repo::RemarkRepository;
use crate::repo::tagging_repo::TaggingRepository;
use crate::repo::RepoError;
use crate::service::resolver::classify;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// What happened to the audit trail for one mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemarkDisposition {
    Added(RemarkId),
    SkippedFrozen,
    SkippedMissingEdition,
}

/// Result of one applied tagging mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub tagging_id: TaggingId,
    /// Owner as read before the mutation; `None` when it no longer exists.
    pub edition: Option<Edition>,
    pub action: TaggingAction,
    pub remark: RemarkDisposition,
}

/// Per-tagging failure. Recoverable: the caller moves on to the next tagging.
#[derive(Debug)]
pub enum MutationError {
    /// Reading the owner or writing the tagging row failed; nothing changed.
    Persistence {
        tagging_id: TaggingId,
        source: RepoError,
    },
    /// The tagging row changed but the remark could not be stored.
    Remark {
        tagging_id: TaggingId,
        edition: Edition,
        action: TaggingAction,
        source: RepoError,
    },
}

impl MutationError {
    pub fn tagging_id(&self) -> TaggingId {
        match self {
            Self::Persistence { tagging_id, .. } | Self::Remark { tagging_id, .. } => *tagging_id,
        }
    }
}

impl Display for MutationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence { tagging_id, source } => {
                write!(f, "tagging {tagging_id} was not migrated: {source}")
            }
            Self::Remark {
                tagging_id,
                edition,
                source,
                ..
            } => write!(
                f,
                "tagging {tagging_id} migrated but remark on edition {} failed: {source}",
                edition.id
            ),
        }
    }
}

impl Error for MutationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence { source, .. } | Self::Remark { source, .. } => Some(source),
        }
    }
}

pub struct TaggingMutator<'a> {
    taggings: &'a dyn TaggingRepository,
    editions: &'a dyn EditionRepository,
    remarks: &'a dyn RemarkRepository,
    author: &'a User,
}

impl<'a> TaggingMutator<'a> {
    pub fn new(
        taggings: &'a dyn TaggingRepository,
        editions: &'a dyn EditionRepository,
        remarks: &'a dyn RemarkRepository,
        author: &'a User,
    ) -> Self {
        Self {
            taggings,
            editions,
            remarks,
            author,
        }
    }

    /// Migrates `tagging` from the instruction's source to its destination topic.
    pub fn apply(
        &self,
        tagging: &Tagging,
        instruction: &SubstitutionInstruction,
    ) -> Result<MutationOutcome, MutationError> {
        let persistence = |source: RepoError| MutationError::Persistence {
            tagging_id: tagging.id,
            source,
        };

        let owner = self
            .editions
            .get_edition(tagging.edition_id)
            .map_err(persistence)?;
        let classification = classify(owner.as_ref(), &instruction.destination_topic_id);
        let (slug, edition_id) = describe_owner(owner.as_ref(), tagging.edition_id);

        match classification {
            TaggingClassification::Conflict => {
                info!(
                    "event=tagging_remove module=mutator status=start tagging_id={} edition_id={edition_id} slug={slug} detail=\"removing tagging on '{slug}' edition {edition_id}\"",
                    tagging.id
                );
                self.taggings
                    .delete_tagging(tagging.id)
                    .map_err(persistence)?;
            }
            TaggingClassification::SimpleChange => {
                info!(
                    "event=tagging_change module=mutator status=start tagging_id={} edition_id={edition_id} slug={slug} detail=\"tagging '{slug}' edition {edition_id}\"",
                    tagging.id
                );
                self.taggings
                    .retag(tagging.id, &instruction.destination_topic_id)
                    .map_err(persistence)?;
            }
        }

        let action = TaggingAction::from(classification);
        let remark = match owner.as_ref() {
            None => {
                info!(
                    "event=remark_skip module=mutator status=skip reason=missing_edition tagging_id={} detail=\" - no edition (probably deleted)\"",
                    tagging.id
                );
                RemarkDisposition::SkippedMissingEdition
            }
            Some(edition) if edition.is_frozen() => {
                info!(
                    "event=remark_skip module=mutator status=skip reason=frozen edition_id={} state={} detail=\" - edition is frozen; skipping editorial remarks\"",
                    edition.id, edition.state
                );
                RemarkDisposition::SkippedFrozen
            }
            Some(edition) => {
                info!(
                    "event=remark_add module=mutator status=start edition_id={} detail=\" - adding editorial remark\"",
                    edition.id
                );
                let body = retagging_remark_body(instruction, action);
                match self.remarks.add_remark(edition.id, self.author.id, &body) {
                    Ok(remark_id) => RemarkDisposition::Added(remark_id),
                    Err(source) => {
                        warn!(
                            "event=remark_add module=mutator status=error edition_id={} error={source}",
                            edition.id
                        );
                        return Err(MutationError::Remark {
                            tagging_id: tagging.id,
                            edition: edition.clone(),
                            action,
                            source,
                        });
                    }
                }
            }
        };

        Ok(MutationOutcome {
            tagging_id: tagging.id,
            edition: owner,
            action,
            remark,
        })
    }
}

fn describe_owner(owner: Option<&Edition>, fallback_id: EditionId) -> (&str, EditionId) {
    match owner {
        Some(edition) => (edition.slug.as_str(), edition.id),
        None => ("<missing>", fallback_id),
    }
}
