//! Substitution instruction read from the change-set table.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// "Replace topic `source_topic_id` with `destination_topic_id`" for every tagging.
///
/// Immutable once read; duplicates and `source == destination` rows are kept
/// and processed as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionInstruction {
    #[serde(rename = "remove_topic")]
    pub source_topic_id: String,
    #[serde(rename = "add_topic")]
    pub destination_topic_id: String,
}

impl SubstitutionInstruction {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source_topic_id: source.into(),
            destination_topic_id: destination.into(),
        }
    }
}

impl Display for SubstitutionInstruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.source_topic_id, self.destination_topic_id
        )
    }
}
