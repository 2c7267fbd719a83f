//! Category/page repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the sidebar hierarchy (categories owning ordered pages).
//! - Keep SQL details and ordering behavior inside the repository boundary.
//!
//! # Invariants
//! - Categories list in id order; pages list in insertion order.
//! - Deleting a category removes its pages in the same statement
//!   (`ON DELETE CASCADE`).
//! - Pages returned here never carry notes; hydration is a service concern.

use crate::model::category::{next_page_id, Category, CategoryId, Page, PageKey};
use crate::repo::{bool_to_int, ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for categories and their pages.
pub trait CategoryRepository {
    /// Lists all categories with their pages.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    /// Loads one category with its pages.
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// Creates one empty, expanded category with the next monotonic id.
    fn create_category(&mut self, name: &str) -> RepoResult<Category>;
    /// Persists the sidebar expansion flag.
    fn set_category_expanded(&mut self, id: CategoryId, expanded: bool) -> RepoResult<()>;
    /// Removes one category and all its pages, returning what was removed.
    fn delete_category(&mut self, id: CategoryId) -> RepoResult<Category>;
    /// Appends one page with id `max + 1` within the category.
    fn create_page(&mut self, category_id: CategoryId, title: &str) -> RepoResult<Page>;
    /// Loads one page by key.
    fn get_page(&self, key: PageKey) -> RepoResult<Option<Page>>;
    /// Removes one page, returning it.
    fn delete_page(&mut self, key: PageKey) -> RepoResult<Page>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn load_pages(&self, category_id: CategoryId) -> RepoResult<Vec<Page>> {
        let mut stmt = self.conn.prepare(
            "SELECT category_id, page_id, title
             FROM pages
             WHERE category_id = ?1
             ORDER BY sort_order ASC;",
        )?;
        let mut rows = stmt.query([category_id])?;
        let mut pages = Vec::new();
        while let Some(row) = rows.next()? {
            pages.push(parse_page_row(row)?);
        }
        Ok(pages)
    }

    fn require_category(&self, id: CategoryId) -> RepoResult<Category> {
        self.get_category(id)?
            .ok_or(RepoError::CategoryNotFound(id))
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, is_expanded FROM categories ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        for category in &mut categories {
            category.pages = self.load_pages(category.id)?;
        }
        Ok(categories)
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name, is_expanded FROM categories WHERE id = ?1;",
                [id],
                |row| Ok(parse_category_row(row)),
            )
            .optional()?
            .transpose()?;

        match category {
            Some(mut category) => {
                category.pages = self.load_pages(id)?;
                Ok(Some(category))
            }
            None => Ok(None),
        }
    }

    fn create_category(&mut self, name: &str) -> RepoResult<Category> {
        self.conn.execute(
            "INSERT INTO categories (name, is_expanded) VALUES (?1, 1);",
            [name],
        )?;
        Ok(Category::new(self.conn.last_insert_rowid(), name))
    }

    fn set_category_expanded(&mut self, id: CategoryId, expanded: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE categories SET is_expanded = ?2 WHERE id = ?1;",
            params![id, bool_to_int(expanded)],
        )?;
        if changed == 0 {
            return Err(RepoError::CategoryNotFound(id));
        }
        Ok(())
    }

    fn delete_category(&mut self, id: CategoryId) -> RepoResult<Category> {
        let category = self.require_category(id)?;
        self.conn
            .execute("DELETE FROM categories WHERE id = ?1;", [id])?;
        Ok(category)
    }

    fn create_page(&mut self, category_id: CategoryId, title: &str) -> RepoResult<Page> {
        let category = self.require_category(category_id)?;
        let page = Page::new(
            category_id,
            next_page_id(category.pages.iter().map(|page| page.id)),
            title,
        );
        self.conn.execute(
            "INSERT INTO pages (category_id, page_id, title, sort_order)
             SELECT ?1, ?2, ?3, COALESCE(MAX(sort_order), -1) + 1
             FROM pages
             WHERE category_id = ?1;",
            params![category_id, page.id, title],
        )?;
        Ok(page)
    }

    fn get_page(&self, key: PageKey) -> RepoResult<Option<Page>> {
        let page = self
            .conn
            .query_row(
                "SELECT category_id, page_id, title
                 FROM pages
                 WHERE category_id = ?1 AND page_id = ?2;",
                params![key.category_id, key.page_id],
                |row| Ok(parse_page_row(row)),
            )
            .optional()?
            .transpose()?;
        Ok(page)
    }

    fn delete_page(&mut self, key: PageKey) -> RepoResult<Page> {
        let page = self.get_page(key)?.ok_or(RepoError::PageNotFound(key))?;
        self.conn.execute(
            "DELETE FROM pages WHERE category_id = ?1 AND page_id = ?2;",
            params![key.category_id, key.page_id],
        )?;
        Ok(page)
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let is_expanded = match row.get::<_, i64>("is_expanded")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_expanded value `{other}` in categories.is_expanded"
            )));
        }
    };

    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        pages: Vec::new(),
        is_expanded,
    })
}

fn parse_page_row(row: &Row<'_>) -> RepoResult<Page> {
    Ok(Page::new(
        row.get("category_id")?,
        row.get("page_id")?,
        row.get::<_, String>("title")?,
    ))
}
