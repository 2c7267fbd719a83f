//! Core domain logic for the notebook: categories, pages and notes.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{Category, CategoryId, Page, PageId, PageKey};
pub use model::note::{ImageError, Note, NoteDraft, NoteId, NoteImage, NoteValidationError};
pub use model::user::{Credentials, User};
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::memory::{InMemoryCategoryRepository, InMemoryNoteRepository};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::{RepoError, RepoResult};
pub use service::notebook_service::{
    now_epoch_ms, NotebookService, SidebarState, StoreError, StoreResult,
};
pub use service::session_service::{
    AuthProvider, LoginError, MockAuthProvider, SessionService, LOGIN_FAILED_MESSAGE,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
