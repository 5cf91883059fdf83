//! Edition domain model.
//!
//! # Invariants
//! - `state` is one of the fixed workflow states; unknown values are rejected
//!   at the storage boundary.
//! - `specialist_sector_tags` mirrors the tagging rows at read time only.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type EditionId = i64;
pub type DocumentId = i64;

/// Workflow state of one edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditionState {
    Imported,
    Draft,
    Submitted,
    Rejected,
    Scheduled,
    Published,
    Superseded,
    Deleted,
    Archived,
}

impl EditionState {
    /// Terminal states that no longer accept editorial remarks.
    pub const FROZEN: [EditionState; 3] = [Self::Superseded, Self::Deleted, Self::Archived];

    pub fn is_frozen(self) -> bool {
        Self::FROZEN.contains(&self)
    }

    pub fn is_published(self) -> bool {
        self == Self::Published
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Imported => "imported",
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Rejected => "rejected",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Superseded => "superseded",
            Self::Deleted => "deleted",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "imported" => Some(Self::Imported),
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "rejected" => Some(Self::Rejected),
            "scheduled" => Some(Self::Scheduled),
            "published" => Some(Self::Published),
            "superseded" => Some(Self::Superseded),
            "deleted" => Some(Self::Deleted),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl Display for EditionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One editorial edition together with its current topic tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edition {
    pub id: EditionId,
    pub document_id: DocumentId,
    /// Document slug shared by every edition of the lineage.
    pub slug: String,
    /// Concrete edition type name, e.g. `Publication` or `DetailedGuide`.
    pub edition_type: String,
    pub state: EditionState,
    pub title: String,
    /// Topic ids attached through `specialist_sectors`, ordered by tagging id.
    pub specialist_sector_tags: Vec<String>,
}

impl Edition {
    /// Returns whether `topic_id` is currently attached to this edition.
    pub fn has_topic(&self, topic_id: &str) -> bool {
        self.specialist_sector_tags
            .iter()
            .any(|tag| tag.as_str() == topic_id)
    }

    pub fn is_frozen(&self) -> bool {
        self.state.is_frozen()
    }
}
