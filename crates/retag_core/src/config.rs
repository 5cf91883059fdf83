//! Runtime settings for one reconciliation run.
//!
//! # Invariants
//! - `validate()` must pass before a database is opened or logging starts.
//! - The audit author is identified by email only; the account is resolved
//!   once per run and injected into the mutator.

use crate::error::{RetagError, RetagResult};
use crate::logging::default_log_level;
use crate::model::remark::User;
use crate::repo::user_repo::UserRepository;
use log::{error, info};
use std::path::PathBuf;

/// System account that bulk retagging remarks are attributed to.
pub const DEFAULT_AUDIT_AUTHOR_EMAIL: &str = "govuk-whitehall@digital.cabinet-office.gov.uk";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetagConfig {
    /// Change-set table with `remove_topic` and `add_topic` columns.
    pub input_path: PathBuf,
    pub database_path: PathBuf,
    pub audit_author_email: String,
    pub log_level: String,
    /// Absolute directory for rotating log files.
    pub log_dir: PathBuf,
    /// Resolve and report only; no tagging, remark or downstream writes.
    pub dry_run: bool,
}

impl RetagConfig {
    pub fn new(
        input_path: impl Into<PathBuf>,
        database_path: impl Into<PathBuf>,
        log_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            database_path: database_path.into(),
            audit_author_email: DEFAULT_AUDIT_AUTHOR_EMAIL.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: log_dir.into(),
            dry_run: false,
        }
    }

    pub fn validate(&self) -> RetagResult<()> {
        if self.input_path.as_os_str().is_empty() {
            return Err(RetagError::Configuration(
                "input path cannot be empty".to_string(),
            ));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(RetagError::Configuration(
                "database path cannot be empty".to_string(),
            ));
        }
        let email = self.audit_author_email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(RetagError::Configuration(format!(
                "audit author email `{}` is not an email address",
                self.audit_author_email
            )));
        }
        if !self.log_dir.is_absolute() {
            return Err(RetagError::Configuration(format!(
                "log dir must be an absolute path, got `{}`",
                self.log_dir.display()
            )));
        }
        Ok(())
    }
}

/// Looks up the account remarks are attributed to.
///
/// # Errors
/// - `Configuration` when no user has `email`; remarks cannot be attributed.
/// - `Persistence` when the lookup itself fails.
pub fn resolve_audit_author(users: &dyn UserRepository, email: &str) -> RetagResult<User> {
    match users.find_user_by_email(email)? {
        Some(user) => {
            info!(
                "event=audit_author_resolve module=config status=ok user_id={}",
                user.id
            );
            Ok(user)
        }
        None => {
            error!("event=audit_author_resolve module=config status=error email={email}");
            Err(RetagError::Configuration(format!(
                "audit author account `{email}` does not exist"
            )))
        }
    }
}
