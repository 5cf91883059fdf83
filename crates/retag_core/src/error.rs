//! Run-level errors. Each variant halts the whole reconciliation run.

use crate::change_set::ChangeSetError;
use crate::db::DbError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RetagResult<T> = Result<T, RetagError>;

#[derive(Debug)]
pub enum RetagError {
    /// Change-set table is unreadable or malformed; raised before any mutation.
    InputFormat(ChangeSetError),
    /// Settings or the audit author account are unusable.
    Configuration(String),
    /// Storage failed outside a per-record boundary (e.g. while resolving).
    Persistence(RepoError),
    Db(DbError),
}

impl Display for RetagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InputFormat(err) => write!(f, "input format error: {err}"),
            Self::Configuration(message) => write!(f, "configuration error: {message}"),
            Self::Persistence(err) => write!(f, "persistence error: {err}"),
            Self::Db(err) => write!(f, "database error: {err}"),
        }
    }
}

impl Error for RetagError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InputFormat(err) => Some(err),
            Self::Configuration(_) => None,
            Self::Persistence(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<ChangeSetError> for RetagError {
    fn from(value: ChangeSetError) -> Self {
        Self::InputFormat(value)
    }
}

impl From<RepoError> for RetagError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

impl From<DbError> for RetagError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}
