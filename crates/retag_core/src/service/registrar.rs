//! Re-registers published editions with the downstream systems of record.
//!
//! # Invariants
//! - Calls run in order: legacy registry, publishing queue, search index.
//! - A legacy registry failure stops the remaining calls for that edition.
//! - No failure isolation between editions happens here; callers own it.

use crate::downstream::{
    DownstreamError, LegacyRegistry, PublishOptions, PublishQueue, RegisterableEdition,
    SearchIndex,
};
use crate::model::edition::Edition;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which downstream step failed for one edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    LegacyRegistry(DownstreamError),
    SearchIndex(DownstreamError),
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LegacyRegistry(err) => write!(f, "legacy registration failed: {err}"),
            Self::SearchIndex(err) => write!(f, "search indexing failed: {err}"),
        }
    }
}

impl Error for RegistrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LegacyRegistry(err) | Self::SearchIndex(err) => Some(err),
        }
    }
}

pub struct PublicationRegistrar<'a> {
    legacy: &'a dyn LegacyRegistry,
    queue: &'a dyn PublishQueue,
    search: &'a dyn SearchIndex,
}

impl<'a> PublicationRegistrar<'a> {
    pub fn new(
        legacy: &'a dyn LegacyRegistry,
        queue: &'a dyn PublishQueue,
        search: &'a dyn SearchIndex,
    ) -> Self {
        Self {
            legacy,
            queue,
            search,
        }
    }

    /// Pushes one edition to all three downstream systems.
    pub fn register(&self, edition: &Edition) -> Result<(), RegistrationError> {
        info!(
            "event=edition_register module=registrar status=start edition_id={} slug={} detail=\"registering '{}'\"",
            edition.id, edition.slug, edition.slug
        );

        let projection = RegisterableEdition::from_edition(edition);
        self.legacy
            .register(&projection)
            .map_err(RegistrationError::LegacyRegistry)?;
        debug!(
            "event=legacy_register module=registrar status=ok edition_id={}",
            edition.id
        );

        self.queue
            .enqueue(&edition.edition_type, edition.id, &PublishOptions::republish());
        debug!(
            "event=publish_enqueue module=registrar status=ok edition_id={} update_type=republish",
            edition.id
        );

        self.search
            .index(edition)
            .map_err(RegistrationError::SearchIndex)?;
        debug!(
            "event=search_index module=registrar status=ok edition_id={}",
            edition.id
        );
        Ok(())
    }

    /// Registers editions in order, stopping at the first failure.
    pub fn register_all(&self, editions: &[Edition]) -> Result<(), RegistrationError> {
        for edition in editions {
            self.register(edition)?;
        }
        Ok(())
    }
}
