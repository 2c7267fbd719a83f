//! Domain model for the notebook sidebar tree and note editor.
//!
//! # Responsibility
//! - Define the category → page → note hierarchy used by core logic.
//! - Define editor payloads (`NoteDraft`) and session identity (`User`).
//!
//! # Invariants
//! - Every page belongs to exactly one category; every note to one page.
//! - Ids are assigned by the store, never by callers.

pub mod category;
pub mod note;
pub mod user;
