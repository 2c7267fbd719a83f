//! SQLite storage bootstrap for the notebook repositories.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the SQLite backend.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Repositories must not touch a connection before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or upgrading a notebook database.
#[derive(Debug)]
pub enum DbError {
    /// The notebook file (or in-memory store) could not be opened.
    Open {
        location: String,
        source: rusqlite::Error,
    },
    /// A numbered migration failed; nothing from the batch was kept.
    Migration { version: u32, source: rusqlite::Error },
    /// The notebook file was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { location, source } => {
                write!(f, "cannot open notebook database `{location}`: {source}")
            }
            Self::Migration { version, source } => {
                write!(f, "notebook schema migration {version} failed: {source}")
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "notebook was saved with schema {found}; this build reads up to {supported}"
            ),
            Self::Sqlite(err) => write!(f, "notebook storage error: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
