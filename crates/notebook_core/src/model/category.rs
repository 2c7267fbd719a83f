//! Category and page domain model.
//!
//! # Responsibility
//! - Define the sidebar hierarchy: categories own ordered pages.
//! - Provide the per-category page id policy.
//!
//! # Invariants
//! - `Page::category_id` always names the category whose `pages` holds it.
//! - Page ids are unique inside one category only; use `PageKey` to address
//!   a page globally.
//! - Page ids are assigned as `max(existing ids, 0) + 1`, so deleting the
//!   highest page frees its id for the next page.

use crate::model::note::Note;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned category identifier.
pub type CategoryId = i64;

/// Page identifier, scoped to its owning category.
pub type PageId = i64;

/// Globally unique address of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageKey {
    pub category_id: CategoryId,
    pub page_id: PageId,
}

impl PageKey {
    pub fn new(category_id: CategoryId, page_id: PageId) -> Self {
        Self {
            category_id,
            page_id,
        }
    }
}

impl Display for PageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.category_id, self.page_id)
    }
}

/// Top-level grouping shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Pages in insertion order.
    pub pages: Vec<Page>,
    /// Sidebar expansion flag. New categories start expanded.
    pub is_expanded: bool,
}

impl Category {
    /// Creates an empty, expanded category.
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            pages: Vec::new(),
            is_expanded: true,
        }
    }

    /// Returns the id the next page of this category receives.
    pub fn next_page_id(&self) -> PageId {
        next_page_id(self.pages.iter().map(|page| page.id))
    }

    pub fn page(&self, page_id: PageId) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == page_id)
    }
}

/// Named container for notes, owned by exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub category_id: CategoryId,
    /// Hydrated only by tree reads; repositories store pages without notes.
    pub notes: Vec<Note>,
}

impl Page {
    /// Creates an empty page linked to `category_id`.
    pub fn new(category_id: CategoryId, id: PageId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            category_id,
            notes: Vec::new(),
        }
    }

    pub fn key(&self) -> PageKey {
        PageKey::new(self.category_id, self.id)
    }
}

/// Computes `max(ids, 0) + 1`.
pub fn next_page_id(ids: impl IntoIterator<Item = PageId>) -> PageId {
    ids.into_iter().fold(0, PageId::max) + 1
}

#[cfg(test)]
mod tests {
    use super::{next_page_id, Category, Page};

    #[test]
    fn next_page_id_starts_at_one() {
        assert_eq!(next_page_id([]), 1);
        assert_eq!(Category::new(1, "Empty").next_page_id(), 1);
    }

    #[test]
    fn next_page_id_uses_max_not_count() {
        let mut category = Category::new(1, "Personnel");
        category.pages.push(Page::new(1, 2, "Idées"));
        category.pages.push(Page::new(1, 7, "Archive"));
        assert_eq!(category.next_page_id(), 8);
    }

    #[test]
    fn page_key_serializes_in_camel_case() {
        let page = Page::new(4, 2, "Idées");
        let json = serde_json::to_value(page.key()).unwrap();
        assert_eq!(json["categoryId"], 4);
        assert_eq!(json["pageId"], 2);
    }
}
