//! Repository layer: storage abstraction for categories, pages and notes.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Provide an in-memory backend and a SQLite backend behind the same traits.
//!
//! # Invariants
//! - Repositories assign ids; callers never pick them.
//! - Missing targets are reported as `NotFound` errors, never as silent no-ops.
//! - Category and note ids are never reused. Page ids follow `max + 1` within
//!   their category.

use crate::db::migrations::latest_version;
use crate::db::{migrations::current_user_version, DbError};
use crate::model::category::{CategoryId, PageKey};
use crate::model::note::NoteId;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod category_repo;
pub mod memory;
pub mod note_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error shared by all repository backends.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    CategoryNotFound(CategoryId),
    PageNotFound(PageKey),
    NoteNotFound(NoteId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::PageNotFound(key) => write!(f, "page not found: {key}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "notebook repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted notebook data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejects connections that did not go through `open_db*`.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
