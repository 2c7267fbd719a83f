//! Notebook use-case service (the domain store).
//!
//! # Responsibility
//! - Validate category/page/note invariants above the repository layer.
//! - Stamp note timestamps and keep referential links consistent.
//! - Hold sidebar state: collapsed flag and the selected page.
//!
//! # Invariants
//! - Blank category names and page titles never create an entity.
//! - A note can only be created on, or moved to, an existing page.
//! - Deleting a category removes its pages and their notes; deleting a page
//!   removes its notes. Page ids can be reused, so orphaned notes would
//!   otherwise reattach to a later page.
//! - The selection never points at a deleted page.

use crate::model::category::{Category, CategoryId, Page, PageKey};
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::memory::{InMemoryCategoryRepository, InMemoryNoteRepository};
use crate::repo::note_repo::NoteRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from notebook use-case operations.
#[derive(Debug)]
pub enum StoreError {
    /// Category name is blank after trim.
    BlankName,
    /// Page title is blank after trim.
    BlankTitle,
    CategoryNotFound(CategoryId),
    PageNotFound(PageKey),
    NoteNotFound(NoteId),
    /// Backend failure.
    Repo(RepoError),
}

impl StoreError {
    /// Whether the target of the operation does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CategoryNotFound(_) | Self::PageNotFound(_) | Self::NoteNotFound(_)
        )
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "category name must not be blank"),
            Self::BlankTitle => write!(f, "page title must not be blank"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::PageNotFound(key) => write!(f, "page not found: {key}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::CategoryNotFound(id) => Self::CategoryNotFound(id),
            RepoError::PageNotFound(key) => Self::PageNotFound(key),
            RepoError::NoteNotFound(id) => Self::NoteNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Sidebar view state driven by user toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SidebarState {
    pub collapsed: bool,
    pub selected_page: Option<PageKey>,
}

/// Returns the current time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Domain store over injected category and note repositories.
pub struct NotebookService<C: CategoryRepository, N: NoteRepository> {
    categories: C,
    notes: N,
    sidebar: SidebarState,
    clock: fn() -> i64,
}

impl NotebookService<InMemoryCategoryRepository, InMemoryNoteRepository> {
    /// Creates an empty session-scoped store.
    pub fn in_memory() -> Self {
        Self::new(InMemoryCategoryRepository::new(), InMemoryNoteRepository::new())
    }
}

impl<C: CategoryRepository, N: NoteRepository> NotebookService<C, N> {
    /// Creates a service from repository implementations.
    pub fn new(categories: C, notes: N) -> Self {
        Self {
            categories,
            notes,
            sidebar: SidebarState::default(),
            clock: now_epoch_ms,
        }
    }

    /// Replaces the timestamp source used for note stamps.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    // Notes

    /// Lists all notes, or only the notes of `page`, in insertion order.
    pub fn list_notes(&self, page: Option<PageKey>) -> StoreResult<Vec<Note>> {
        self.notes.list_notes(page).map_err(Into::into)
    }

    /// Gets one note by id.
    pub fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.notes.get_note(id).map_err(Into::into)
    }

    /// Stores a new note on an existing page.
    ///
    /// Title/content are not re-validated here; the editor runs
    /// `NoteDraft::validate` before submitting.
    pub fn create_note(&mut self, draft: NoteDraft) -> StoreResult<Note> {
        self.ensure_page_exists(draft.page)?;
        let note = self.notes.create_note(&draft, (self.clock)())?;
        info!(
            "event=note_create module=service status=ok note_id={} page={} images={}",
            note.id,
            note.page,
            note.images.len()
        );
        Ok(note)
    }

    /// Replaces a note's editable fields and refreshes `updated_at`.
    ///
    /// # Errors
    /// - `PageNotFound` when `draft.page` does not exist.
    /// - `NoteNotFound` when `id` does not exist.
    pub fn update_note(&mut self, id: NoteId, draft: NoteDraft) -> StoreResult<Note> {
        self.ensure_page_exists(draft.page)?;
        match self.notes.update_note(id, &draft, (self.clock)()) {
            Ok(note) => {
                info!("event=note_update module=service status=ok note_id={id}");
                Ok(note)
            }
            Err(err) => {
                warn!("event=note_update module=service status=error note_id={id} error={err}");
                Err(err.into())
            }
        }
    }

    /// Removes one note and returns it. A second call reports `NoteNotFound`.
    pub fn delete_note(&mut self, id: NoteId) -> StoreResult<Note> {
        match self.notes.delete_note(id) {
            Ok(note) => {
                info!("event=note_delete module=service status=ok note_id={id}");
                Ok(note)
            }
            Err(err) => {
                warn!("event=note_delete module=service status=error note_id={id} error={err}");
                Err(err.into())
            }
        }
    }

    // Categories and pages

    /// Returns the sidebar tree with every page's notes hydrated.
    pub fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let mut by_page: HashMap<PageKey, Vec<Note>> = HashMap::new();
        for note in self.notes.list_notes(None)? {
            by_page.entry(note.page).or_default().push(note);
        }

        let mut categories = self.categories.list_categories()?;
        for page in categories
            .iter_mut()
            .flat_map(|category| category.pages.iter_mut())
        {
            page.notes = by_page.remove(&page.key()).unwrap_or_default();
        }
        Ok(categories)
    }

    /// Creates an empty category.
    ///
    /// Blank names are rejected and nothing is created. The stored name is
    /// the trimmed input, not the text exactly as typed.
    pub fn add_category(&mut self, name: &str) -> StoreResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            warn!("event=category_create module=service status=rejected reason=blank_name");
            return Err(StoreError::BlankName);
        }
        let category = self.categories.create_category(name)?;
        info!(
            "event=category_create module=service status=ok category_id={}",
            category.id
        );
        Ok(category)
    }

    /// Removes a category with all its pages and their notes.
    ///
    /// Confirmation is the caller's concern.
    pub fn delete_category(&mut self, id: CategoryId) -> StoreResult<Category> {
        if self.categories.get_category(id)?.is_none() {
            return Err(StoreError::CategoryNotFound(id));
        }
        let removed_notes = self.notes.delete_notes_for_category(id)?;
        let category = self.categories.delete_category(id)?;
        if self
            .sidebar
            .selected_page
            .is_some_and(|key| key.category_id == id)
        {
            self.sidebar.selected_page = None;
        }
        info!(
            "event=category_delete module=service status=ok category_id={id} pages={} notes={removed_notes}",
            category.pages.len()
        );
        Ok(category)
    }

    /// Appends a page with id `max(existing page ids in category, 0) + 1`.
    ///
    /// Blank titles are rejected. The stored title is the trimmed input, not
    /// the text exactly as typed.
    pub fn add_page(&mut self, category_id: CategoryId, title: &str) -> StoreResult<Page> {
        let title = title.trim();
        if title.is_empty() {
            warn!(
                "event=page_create module=service status=rejected reason=blank_title category_id={category_id}"
            );
            return Err(StoreError::BlankTitle);
        }
        let page = self.categories.create_page(category_id, title)?;
        info!(
            "event=page_create module=service status=ok page={}",
            page.key()
        );
        Ok(page)
    }

    /// Removes a page and its notes. Confirmation is the caller's concern.
    pub fn delete_page(&mut self, key: PageKey) -> StoreResult<Page> {
        self.ensure_page_exists(key)?;
        let removed_notes = self.notes.delete_notes_for_page(key)?;
        let page = self.categories.delete_page(key)?;
        if self.sidebar.selected_page == Some(key) {
            self.sidebar.selected_page = None;
        }
        info!("event=page_delete module=service status=ok page={key} notes={removed_notes}");
        Ok(page)
    }

    // Sidebar state

    /// Flips a category's expansion flag and returns the new value.
    pub fn toggle_category_expansion(&mut self, id: CategoryId) -> StoreResult<bool> {
        let category = self
            .categories
            .get_category(id)?
            .ok_or(StoreError::CategoryNotFound(id))?;
        let expanded = !category.is_expanded;
        self.categories.set_category_expanded(id, expanded)?;
        Ok(expanded)
    }

    /// Marks a page as selected; its notes become the visible notes.
    pub fn select_page(&mut self, key: PageKey) -> StoreResult<Page> {
        let page = self
            .categories
            .get_page(key)?
            .ok_or(StoreError::PageNotFound(key))?;
        self.sidebar.selected_page = Some(key);
        Ok(page)
    }

    /// Flips the sidebar collapsed flag and returns the new value.
    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar.collapsed = !self.sidebar.collapsed;
        self.sidebar.collapsed
    }

    pub fn is_sidebar_collapsed(&self) -> bool {
        self.sidebar.collapsed
    }

    pub fn selected_page(&self) -> Option<PageKey> {
        self.sidebar.selected_page
    }

    pub fn sidebar(&self) -> SidebarState {
        self.sidebar
    }

    /// Notes of the selected page; empty when nothing is selected.
    pub fn visible_notes(&self) -> StoreResult<Vec<Note>> {
        match self.sidebar.selected_page {
            Some(key) => self.list_notes(Some(key)),
            None => Ok(Vec::new()),
        }
    }

    fn ensure_page_exists(&self, key: PageKey) -> StoreResult<()> {
        match self.categories.get_page(key)? {
            Some(_) => Ok(()),
            None => Err(StoreError::PageNotFound(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{now_epoch_ms, NotebookService, StoreError};
    use crate::model::category::PageKey;
    use crate::repo::RepoError;

    #[test]
    fn now_epoch_ms_is_after_2020() {
        assert!(now_epoch_ms() > 1_577_836_800_000);
    }

    #[test]
    fn repo_not_found_maps_to_store_not_found() {
        let key = PageKey::new(1, 2);
        assert!(matches!(
            StoreError::from(RepoError::PageNotFound(key)),
            StoreError::PageNotFound(found) if found == key
        ));
        assert!(StoreError::from(RepoError::NoteNotFound(3)).is_not_found());
        assert!(!StoreError::BlankName.is_not_found());
    }

    #[test]
    fn sidebar_toggle_flips_collapsed_flag() {
        let mut service = NotebookService::in_memory();
        assert!(!service.is_sidebar_collapsed());
        assert!(service.toggle_sidebar());
        assert!(service.sidebar().collapsed);
        assert!(!service.toggle_sidebar());
        assert!(!service.sidebar().collapsed);
        assert_eq!(service.sidebar().selected_page, None);
    }

    #[test]
    fn sidebar_snapshot_tracks_selection_and_trimmed_names() {
        let mut service = NotebookService::in_memory();
        let category = service.add_category("  Travail ").unwrap();
        let page = service.add_page(category.id, " Réunions  ").unwrap();
        assert_eq!(category.name, "Travail");
        assert_eq!(page.title, "Réunions");

        service.select_page(page.key()).unwrap();
        assert_eq!(service.sidebar().selected_page, Some(page.key()));
        assert!(!service.sidebar().collapsed);
    }
}
