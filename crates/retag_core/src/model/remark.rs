//! Editorial remark audit entries and their authors.

use crate::model::edition::EditionId;
use crate::model::instruction::SubstitutionInstruction;
use crate::model::tagging::TaggingAction;
use serde::{Deserialize, Serialize};

pub type RemarkId = i64;
pub type UserId = i64;

/// Account that remarks are attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

/// Append-only audit entry on an edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorialRemark {
    pub id: RemarkId,
    pub edition_id: EditionId,
    pub author_id: UserId,
    pub body: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Builds the remark body recorded for one applied tagging action.
pub fn retagging_remark_body(instruction: &SubstitutionInstruction, action: TaggingAction) -> String {
    let outcome = match action {
        TaggingAction::Removed => "resulted in duplicate tag - removed it",
        TaggingAction::Changed => "changed tag",
    };
    format!(
        "Bulk retagging from topic '{}' to '{}' {outcome}",
        instruction.source_topic_id, instruction.destination_topic_id
    )
}
