//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes and their ordered image attachments.
//! - Own id assignment and `updated_at` monotonicity.
//!
//! # Invariants
//! - Note listing is ordered by id, which equals insertion order.
//! - `update_note` never rewrites `created_at` and never moves `updated_at`
//!   backwards.
//! - Image rows are replaced as a whole set in the same transaction as the
//!   note row.

use crate::model::category::{CategoryId, PageKey};
use crate::model::note::{Note, NoteDraft, NoteId, NoteImage};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    category_id,
    page_id,
    title,
    content,
    created_at,
    updated_at
FROM notes";

/// Repository interface for note CRUD operations.
pub trait NoteRepository {
    /// Lists all notes, or only the notes of `page`, in insertion order.
    fn list_notes(&self, page: Option<PageKey>) -> RepoResult<Vec<Note>>;
    /// Gets one note by id.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Stores a new note stamped with `now_ms` and returns it.
    fn create_note(&mut self, draft: &NoteDraft, now_ms: i64) -> RepoResult<Note>;
    /// Replaces the editable fields of an existing note.
    fn update_note(&mut self, id: NoteId, draft: &NoteDraft, now_ms: i64) -> RepoResult<Note>;
    /// Removes one note, returning it.
    fn delete_note(&mut self, id: NoteId) -> RepoResult<Note>;
    /// Removes every note of one page. Returns the number removed.
    fn delete_notes_for_page(&mut self, page: PageKey) -> RepoResult<usize>;
    /// Removes every note of every page of one category.
    fn delete_notes_for_category(&mut self, category_id: CategoryId) -> RepoResult<usize>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_notes(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        for note in &mut notes {
            note.images = load_images(self.conn, note.id)?;
        }
        Ok(notes)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn list_notes(&self, page: Option<PageKey>) -> RepoResult<Vec<Note>> {
        match page {
            Some(key) => self.query_notes(
                &format!(
                    "{NOTE_SELECT_SQL}
                     WHERE category_id = ?1 AND page_id = ?2
                     ORDER BY id ASC;"
                ),
                params![key.category_id, key.page_id],
            ),
            None => self.query_notes(&format!("{NOTE_SELECT_SQL} ORDER BY id ASC;"), []),
        }
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("{NOTE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_note_row(row)),
            )
            .optional()?
            .transpose()?;

        match note {
            Some(mut note) => {
                note.images = load_images(self.conn, note.id)?;
                Ok(Some(note))
            }
            None => Ok(None),
        }
    }

    fn create_note(&mut self, draft: &NoteDraft, now_ms: i64) -> RepoResult<Note> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO notes (
                category_id,
                page_id,
                title,
                content,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
            params![
                draft.page.category_id,
                draft.page.page_id,
                draft.title.as_str(),
                draft.content.as_str(),
                now_ms,
            ],
        )?;
        let id = tx.last_insert_rowid();
        replace_images(&tx, id, &draft.images)?;
        tx.commit()?;

        Ok(Note {
            id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            created_at: now_ms,
            updated_at: now_ms,
            page: draft.page,
            images: draft.images.clone(),
        })
    }

    fn update_note(&mut self, id: NoteId, draft: &NoteDraft, now_ms: i64) -> RepoResult<Note> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE notes
             SET
                category_id = ?2,
                page_id = ?3,
                title = ?4,
                content = ?5,
                updated_at = MAX(updated_at, ?6)
             WHERE id = ?1;",
            params![
                id,
                draft.page.category_id,
                draft.page.page_id,
                draft.title.as_str(),
                draft.content.as_str(),
                now_ms,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NoteNotFound(id));
        }
        replace_images(&tx, id, &draft.images)?;
        tx.commit()?;

        self.get_note(id)?.ok_or(RepoError::NoteNotFound(id))
    }

    fn delete_note(&mut self, id: NoteId) -> RepoResult<Note> {
        let note = self.get_note(id)?.ok_or(RepoError::NoteNotFound(id))?;
        self.conn.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Ok(note)
    }

    fn delete_notes_for_page(&mut self, page: PageKey) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM notes WHERE category_id = ?1 AND page_id = ?2;",
            params![page.category_id, page.page_id],
        )?;
        Ok(removed)
    }

    fn delete_notes_for_category(&mut self, category_id: CategoryId) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM notes WHERE category_id = ?1;", [category_id])?;
        Ok(removed)
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let created_at: i64 = row.get("created_at")?;
    let updated_at: i64 = row.get("updated_at")?;
    if updated_at < created_at {
        return Err(RepoError::InvalidData(format!(
            "notes.updated_at {updated_at} is earlier than created_at {created_at}"
        )));
    }

    Ok(Note {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at,
        updated_at,
        page: PageKey::new(row.get("category_id")?, row.get("page_id")?),
        images: Vec::new(),
    })
}

fn load_images(conn: &Connection, note_id: NoteId) -> RepoResult<Vec<NoteImage>> {
    let mut stmt = conn.prepare(
        "SELECT name, url
         FROM note_images
         WHERE note_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([note_id])?;
    let mut images = Vec::new();
    while let Some(row) = rows.next()? {
        images.push(NoteImage {
            name: row.get("name")?,
            url: row.get("url")?,
        });
    }
    Ok(images)
}

fn replace_images(conn: &Connection, note_id: NoteId, images: &[NoteImage]) -> RepoResult<()> {
    conn.execute("DELETE FROM note_images WHERE note_id = ?1;", [note_id])?;
    for (position, image) in images.iter().enumerate() {
        conn.execute(
            "INSERT INTO note_images (note_id, position, name, url)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                note_id,
                position as i64,
                image.name.as_str(),
                image.url.as_str()
            ],
        )?;
    }
    Ok(())
}
