//! Change-set table reader.
//!
//! # Responsibility
//! - Parse a delimited text table of `remove_topic,add_topic` pairs into
//!   ordered substitution instructions.
//!
//! # Invariants
//! - The whole table is read before any instruction is returned.
//! - Row order and duplicate rows are preserved.
//! - Header names are matched case-sensitively; extra columns are ignored.

use crate::model::instruction::SubstitutionInstruction;
use csv::{ReaderBuilder, StringRecord};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const REMOVE_TOPIC_COLUMN: &str = "remove_topic";
pub const ADD_TOPIC_COLUMN: &str = "add_topic";
const REQUIRED_COLUMNS: [&str; 2] = [REMOVE_TOPIC_COLUMN, ADD_TOPIC_COLUMN];

pub type ChangeSetResult<T> = Result<T, ChangeSetError>;

/// Input-format failures. All of them halt a run before any mutation.
#[derive(Debug)]
pub enum ChangeSetError {
    /// Source could not be opened or read.
    Io {
        path: Option<PathBuf>,
        source: std::io::Error,
    },
    /// Header row is absent.
    MissingHeader,
    /// Header row does not name a required column.
    MissingColumn(&'static str),
    /// A data row could not be mapped onto the header.
    MalformedRow { line: Option<u64>, message: String },
}

impl Display for ChangeSetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io {
                path: Some(path),
                source,
            } => write!(f, "cannot read change set `{}`: {source}", path.display()),
            Self::Io { path: None, source } => write!(f, "cannot read change set: {source}"),
            Self::MissingHeader => write!(f, "change set has no header row"),
            Self::MissingColumn(column) => {
                write!(f, "change set header is missing required column `{column}`")
            }
            Self::MalformedRow {
                line: Some(line),
                message,
            } => write!(f, "malformed change set row at line {line}: {message}"),
            Self::MalformedRow {
                line: None,
                message,
            } => write!(f, "malformed change set row: {message}"),
        }
    }
}

impl Error for ChangeSetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<csv::Error> for ChangeSetError {
    fn from(value: csv::Error) -> Self {
        let line = value.position().map(|position| position.line());
        if value.is_io_error() {
            if let csv::ErrorKind::Io(source) = value.into_kind() {
                return Self::Io { path: None, source };
            }
            return Self::MalformedRow {
                line,
                message: "unreadable input".to_string(),
            };
        }
        Self::MalformedRow {
            line,
            message: value.to_string(),
        }
    }
}

/// Reads substitution instructions from a change-set file.
pub fn read(path: impl AsRef<Path>) -> ChangeSetResult<Vec<SubstitutionInstruction>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| {
        error!(
            "event=change_set_read module=change_set status=error path={} error={source}",
            path.display()
        );
        ChangeSetError::Io {
            path: Some(path.to_path_buf()),
            source,
        }
    })?;

    let instructions = read_from(file)?;
    info!(
        "event=change_set_read module=change_set status=ok path={} instructions={}",
        path.display(),
        instructions.len()
    );
    Ok(instructions)
}

/// Reads substitution instructions from any byte source.
///
/// The source is consumed and dropped before returning.
pub fn read_from<R: Read>(source: R) -> ChangeSetResult<Vec<SubstitutionInstruction>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    ensure_required_columns(&headers)?;

    let mut instructions = Vec::new();
    for record in reader.records() {
        let record = record?;
        let instruction: SubstitutionInstruction =
            record.deserialize(Some(&headers)).map_err(|err| {
                ChangeSetError::MalformedRow {
                    line: record.position().map(|position| position.line()),
                    message: err.to_string(),
                }
            })?;
        instructions.push(instruction);
    }

    Ok(instructions)
}

fn ensure_required_columns(headers: &StringRecord) -> ChangeSetResult<()> {
    if headers.is_empty() {
        return Err(ChangeSetError::MissingHeader);
    }
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(ChangeSetError::MissingColumn(column));
        }
    }
    Ok(())
}
