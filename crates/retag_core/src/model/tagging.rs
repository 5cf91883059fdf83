//! Tagging association between an edition and a topic.

use crate::model::edition::EditionId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaggingId = i64;

/// One `specialist_sectors` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagging {
    pub id: TaggingId,
    pub edition_id: EditionId,
    /// Topic id this row points at.
    pub tag: String,
}

/// Validation failures for tagging writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggingValidationError {
    BlankTag,
}

impl Display for TaggingValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTag => write!(f, "tag cannot be blank"),
        }
    }
}

impl Error for TaggingValidationError {}

/// Validates a topic id before it is written to a tagging row.
pub fn validate_tag(tag: &str) -> Result<(), TaggingValidationError> {
    if tag.trim().is_empty() {
        return Err(TaggingValidationError::BlankTag);
    }
    Ok(())
}

impl Tagging {
    pub fn validate(&self) -> Result<(), TaggingValidationError> {
        validate_tag(&self.tag)
    }
}

/// How one tagging is migrated, decided against the live topic set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggingClassification {
    /// Owner already carries the destination topic; the row is deleted.
    Conflict,
    /// Row is rewritten to point at the destination topic.
    SimpleChange,
}

/// Mutation that was actually applied to a tagging row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaggingAction {
    Removed,
    Changed,
}

impl From<TaggingClassification> for TaggingAction {
    fn from(value: TaggingClassification) -> Self {
        match value {
            TaggingClassification::Conflict => Self::Removed,
            TaggingClassification::SimpleChange => Self::Changed,
        }
    }
}
