//! Contracts for the systems of record that mirror published editions.
//!
//! # Responsibility
//! - Describe the legacy registry, publishing queue and search index calls.
//! - Build the registerable projection handed to the legacy registry.
//!
//! # Invariants
//! - `PublishQueue::enqueue` never reports failure to the caller.
//! - Implementations perform no retries; a failed call is reported once.

use crate::model::edition::{Edition, EditionId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod outbox;

pub use outbox::SqliteOutbox;

/// Failure reported by one downstream system for one edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamError {
    pub system: &'static str,
    pub message: String,
}

impl DownstreamError {
    pub fn new(system: &'static str, message: impl Into<String>) -> Self {
        Self {
            system,
            message: message.into(),
        }
    }
}

impl Display for DownstreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} rejected the request: {}", self.system, self.message)
    }
}

impl Error for DownstreamError {}

/// Update marker sent with a publishing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    Republish,
}

impl UpdateType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Republish => "republish",
        }
    }
}

/// Options carried by one publishing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOptions {
    pub update_type: UpdateType,
}

impl PublishOptions {
    pub fn republish() -> Self {
        Self {
            update_type: UpdateType::Republish,
        }
    }
}

/// Projection of an edition in the shape the legacy registry accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterableEdition {
    pub edition_id: EditionId,
    pub slug: String,
    pub title: String,
    pub kind: String,
    /// `live` for published editions, `draft` otherwise.
    pub state: String,
    pub paths: Vec<String>,
    pub specialist_sectors: Vec<String>,
}

impl RegisterableEdition {
    pub fn from_edition(edition: &Edition) -> Self {
        let state = if edition.state.is_published() {
            "live"
        } else {
            "draft"
        };
        Self {
            edition_id: edition.id,
            slug: edition.slug.clone(),
            title: edition.title.clone(),
            kind: registry_kind(&edition.edition_type),
            state: state.to_string(),
            paths: vec![format!("/{}", edition.slug)],
            specialist_sectors: edition.specialist_sector_tags.clone(),
        }
    }
}

/// Synchronous legacy catalog/index registry.
pub trait LegacyRegistry {
    fn register(&self, edition: &RegisterableEdition) -> Result<(), DownstreamError>;
}

/// Fire-and-forget asynchronous publishing queue.
pub trait PublishQueue {
    fn enqueue(&self, item_type: &str, item_id: EditionId, options: &PublishOptions);
}

/// Synchronous search index update.
pub trait SearchIndex {
    fn index(&self, edition: &Edition) -> Result<(), DownstreamError>;
}

/// Converts an edition type name (`DetailedGuide`) to registry kind (`detailed_guide`).
fn registry_kind(edition_type: &str) -> String {
    let mut kind = String::with_capacity(edition_type.len() + 4);
    for (index, ch) in edition_type.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if index > 0 {
                kind.push('_');
            }
            kind.push(ch.to_ascii_lowercase());
        } else {
            kind.push(ch);
        }
    }
    kind
}

#[cfg(test)]
mod tests {
    use super::{registry_kind, RegisterableEdition};
    use crate::model::edition::{Edition, EditionState};

    #[test]
    fn registry_kind_is_snake_case() {
        assert_eq!(registry_kind("DetailedGuide"), "detailed_guide");
        assert_eq!(registry_kind("Publication"), "publication");
    }

    #[test]
    fn projection_marks_published_editions_live() {
        let edition = Edition {
            id: 7,
            document_id: 3,
            slug: "oil-licensing".to_string(),
            edition_type: "DetailedGuide".to_string(),
            state: EditionState::Published,
            title: "Oil licensing".to_string(),
            specialist_sector_tags: vec!["oil-and-gas/licensing".to_string()],
        };
        let projection = RegisterableEdition::from_edition(&edition);
        assert_eq!(projection.state, "live");
        assert_eq!(projection.paths, vec!["/oil-licensing".to_string()]);
        assert_eq!(projection.specialist_sectors, edition.specialist_sector_tags);

        let superseded = Edition {
            state: EditionState::Superseded,
            ..edition
        };
        assert_eq!(RegisterableEdition::from_edition(&superseded).state, "draft");
    }
}
