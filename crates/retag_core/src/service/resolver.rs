//! Finds the taggings an instruction affects and classifies them.
//!
//! # Invariants
//! - Taggings are returned in storage order (ascending id).
//! - Classification is computed from a live topic set, never cached.

use crate::model::edition::{Edition, EditionId};
use crate::model::instruction::SubstitutionInstruction;
use crate::model::tagging::{Tagging, TaggingClassification};
use crate::repo::edition_repo::EditionRepository;
use crate::repo::tagging_repo::TaggingRepository;
use crate::repo::RepoResult;
use std::collections::HashSet;

/// A tagging whose owning edition exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedTagging {
    pub tagging: Tagging,
    pub edition: Edition,
}

/// Taggings referencing the source topic of one instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTaggings {
    /// Owner present; these are mutated.
    pub live: Vec<AffectedTagging>,
    /// Owner missing or soft-deleted; counted but left untouched.
    pub orphaned: Vec<Tagging>,
}

impl ResolvedTaggings {
    pub fn total(&self) -> usize {
        self.live.len() + self.orphaned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Decides how one tagging is migrated given its owner's current topics.
///
/// A missing owner has no topics, so it is always a simple change.
pub fn classify(owner: Option<&Edition>, destination_topic_id: &str) -> TaggingClassification {
    match owner {
        Some(edition) if edition.has_topic(destination_topic_id) => {
            TaggingClassification::Conflict
        }
        _ => TaggingClassification::SimpleChange,
    }
}

pub struct TaggingResolver<'a> {
    taggings: &'a dyn TaggingRepository,
    editions: &'a dyn EditionRepository,
}

impl<'a> TaggingResolver<'a> {
    pub fn new(taggings: &'a dyn TaggingRepository, editions: &'a dyn EditionRepository) -> Self {
        Self { taggings, editions }
    }

    /// Returns every tagging on the instruction's source topic, split by
    /// whether its owning edition still exists.
    pub fn resolve_affected(
        &self,
        instruction: &SubstitutionInstruction,
    ) -> RepoResult<ResolvedTaggings> {
        let mut resolved = ResolvedTaggings::default();
        for tagging in self
            .taggings
            .taggings_for_topic(&instruction.source_topic_id)?
        {
            match self.editions.get_edition(tagging.edition_id)? {
                Some(edition) => resolved.live.push(AffectedTagging { tagging, edition }),
                None => resolved.orphaned.push(tagging),
            }
        }
        Ok(resolved)
    }

    /// Maps owners to their latest published edition, dropping owners with
    /// none and keeping the first occurrence of each edition id.
    pub fn published_editions<'e, I>(&self, owners: I) -> RepoResult<Vec<Edition>>
    where
        I: IntoIterator<Item = &'e Edition>,
    {
        let mut seen: HashSet<EditionId> = HashSet::new();
        let mut published = Vec::new();
        for owner in owners {
            if let Some(edition) = self.published_edition_for(owner)? {
                if seen.insert(edition.id) {
                    published.push(edition);
                }
            }
        }
        Ok(published)
    }

    /// Latest published edition of the owner's document, if any.
    pub fn published_edition_for(&self, owner: &Edition) -> RepoResult<Option<Edition>> {
        self.editions.latest_published_edition(owner.document_id)
    }
}
