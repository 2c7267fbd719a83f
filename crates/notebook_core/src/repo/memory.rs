//! In-memory repository backend.
//!
//! Session-scoped `Vec` storage. This is the default backend and keeps
//! data only for the lifetime of the value.
//!
//! # Invariants
//! - Category and note ids come from a high-water counter, so deleting the
//!   newest entity never frees its id.
//! - Collections keep insertion order.

use crate::model::category::{Category, CategoryId, Page, PageKey};
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::note_repo::NoteRepository;
use crate::repo::{RepoError, RepoResult};

/// `Vec`-backed category repository.
#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    categories: Vec<Category>,
    last_id: CategoryId,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn category_mut(&mut self, id: CategoryId) -> RepoResult<&mut Category> {
        self.categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or(RepoError::CategoryNotFound(id))
    }
}

impl CategoryRepository for InMemoryCategoryRepository {
    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        Ok(self.categories.clone())
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        Ok(self
            .categories
            .iter()
            .find(|category| category.id == id)
            .cloned())
    }

    fn create_category(&mut self, name: &str) -> RepoResult<Category> {
        self.last_id += 1;
        let category = Category::new(self.last_id, name);
        self.categories.push(category.clone());
        Ok(category)
    }

    fn set_category_expanded(&mut self, id: CategoryId, expanded: bool) -> RepoResult<()> {
        self.category_mut(id)?.is_expanded = expanded;
        Ok(())
    }

    fn delete_category(&mut self, id: CategoryId) -> RepoResult<Category> {
        let index = self
            .categories
            .iter()
            .position(|category| category.id == id)
            .ok_or(RepoError::CategoryNotFound(id))?;
        Ok(self.categories.remove(index))
    }

    fn create_page(&mut self, category_id: CategoryId, title: &str) -> RepoResult<Page> {
        let category = self.category_mut(category_id)?;
        let page = Page::new(category_id, category.next_page_id(), title);
        category.pages.push(page.clone());
        Ok(page)
    }

    fn get_page(&self, key: PageKey) -> RepoResult<Option<Page>> {
        Ok(self
            .categories
            .iter()
            .find(|category| category.id == key.category_id)
            .and_then(|category| category.page(key.page_id))
            .cloned())
    }

    fn delete_page(&mut self, key: PageKey) -> RepoResult<Page> {
        let category = self
            .category_mut(key.category_id)
            .map_err(|_| RepoError::PageNotFound(key))?;
        let index = category
            .pages
            .iter()
            .position(|page| page.id == key.page_id)
            .ok_or(RepoError::PageNotFound(key))?;
        Ok(category.pages.remove(index))
    }
}

/// `Vec`-backed note repository.
#[derive(Debug, Default)]
pub struct InMemoryNoteRepository {
    notes: Vec<Note>,
    last_id: NoteId,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: NoteId) -> RepoResult<usize> {
        self.notes
            .iter()
            .position(|note| note.id == id)
            .ok_or(RepoError::NoteNotFound(id))
    }

    fn remove_where(&mut self, predicate: impl Fn(&Note) -> bool) -> usize {
        let before = self.notes.len();
        self.notes.retain(|note| !predicate(note));
        before - self.notes.len()
    }
}

impl NoteRepository for InMemoryNoteRepository {
    fn list_notes(&self, page: Option<PageKey>) -> RepoResult<Vec<Note>> {
        Ok(self
            .notes
            .iter()
            .filter(|note| page.map_or(true, |key| note.page == key))
            .cloned()
            .collect())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        Ok(self.notes.iter().find(|note| note.id == id).cloned())
    }

    fn create_note(&mut self, draft: &NoteDraft, now_ms: i64) -> RepoResult<Note> {
        self.last_id += 1;
        let note = Note {
            id: self.last_id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            created_at: now_ms,
            updated_at: now_ms,
            page: draft.page,
            images: draft.images.clone(),
        };
        self.notes.push(note.clone());
        Ok(note)
    }

    fn update_note(&mut self, id: NoteId, draft: &NoteDraft, now_ms: i64) -> RepoResult<Note> {
        let index = self.position(id)?;
        let note = &mut self.notes[index];
        note.title = draft.title.clone();
        note.content = draft.content.clone();
        note.page = draft.page;
        note.images = draft.images.clone();
        note.updated_at = note.updated_at.max(now_ms);
        Ok(note.clone())
    }

    fn delete_note(&mut self, id: NoteId) -> RepoResult<Note> {
        let index = self.position(id)?;
        Ok(self.notes.remove(index))
    }

    fn delete_notes_for_page(&mut self, page: PageKey) -> RepoResult<usize> {
        Ok(self.remove_where(|note| note.page == page))
    }

    fn delete_notes_for_category(&mut self, category_id: CategoryId) -> RepoResult<usize> {
        Ok(self.remove_where(|note| note.page.category_id == category_id))
    }
}
