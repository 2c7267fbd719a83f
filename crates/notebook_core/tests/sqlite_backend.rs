use notebook_core::db::open_db;
use notebook_core::{
    NoteDraft, NoteImage, NotebookService, PageKey, SqliteCategoryRepository,
    SqliteNoteRepository,
};
use rusqlite::Connection;

fn service(
    conn: &Connection,
) -> NotebookService<SqliteCategoryRepository<'_>, SqliteNoteRepository<'_>> {
    NotebookService::new(
        SqliteCategoryRepository::try_new(conn).unwrap(),
        SqliteNoteRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn file_backed_store_survives_reopen_without_reusing_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notebook.db");

    let (category_id, deleted_note_id) = {
        let conn = open_db(&path).unwrap();
        let mut store = service(&conn);
        let category = store.add_category("Personnel").unwrap();
        let page = store.add_page(category.id, "Idées").unwrap();
        let mut draft = NoteDraft::new(page.key(), "Croquis", "Voir image");
        draft.add_image(NoteImage::from_bytes("croquis.png", b"png-bytes").unwrap());
        store.create_note(draft).unwrap();
        let doomed = store
            .create_note(NoteDraft::new(page.key(), "Temp", "x"))
            .unwrap();
        store.delete_note(doomed.id).unwrap();
        store.toggle_category_expansion(category.id).unwrap();
        (category.id, doomed.id)
    };

    let conn = open_db(&path).unwrap();
    let mut store = service(&conn);
    let categories = store.list_categories().unwrap();
    assert_eq!(categories.len(), 1);
    assert!(!categories[0].is_expanded);
    let page = &categories[0].pages[0];
    assert_eq!(page.title, "Idées");
    assert_eq!(page.notes.len(), 1);
    assert_eq!(page.notes[0].images[0].name, "croquis.png");
    assert_eq!(
        page.notes[0].images[0].mime_type(),
        Some("image/png")
    );

    let next = store
        .create_note(NoteDraft::new(PageKey::new(category_id, 1), "Après", "y"))
        .unwrap();
    assert!(next.id > deleted_note_id);
}

#[test]
fn deleting_note_removes_its_image_rows() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("images.db")).unwrap();
    let mut store = service(&conn);
    let category = store.add_category("Photos").unwrap();
    let page = store.add_page(category.id, "Vacances").unwrap();
    let mut draft = NoteDraft::new(page.key(), "Plage", "Soleil");
    draft.add_image(NoteImage::from_bytes("a.png", b"a").unwrap());
    draft.add_image(NoteImage::from_bytes("b.png", b"b").unwrap());
    let note = store.create_note(draft).unwrap();

    store.delete_note(note.id).unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM note_images;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn notes_serialize_with_external_field_names() {
    let mut store = NotebookService::in_memory().with_clock(|| 1_000);
    let category = store.add_category("Personnel").unwrap();
    let page = store.add_page(category.id, "Idées").unwrap();
    let note = store
        .create_note(NoteDraft::new(page.key(), "Titre", "Corps"))
        .unwrap();

    let json = serde_json::to_value(&note).unwrap();
    assert_eq!(json["createdAt"], 1_000);
    assert_eq!(json["updatedAt"], 1_000);
    assert_eq!(json["pageId"]["categoryId"], category.id);
    assert_eq!(json["pageId"]["pageId"], page.id);
    assert!(json["images"].as_array().unwrap().is_empty());

    let tree = serde_json::to_value(store.list_categories().unwrap()).unwrap();
    assert_eq!(tree[0]["isExpanded"], true);
    assert_eq!(tree[0]["pages"][0]["categoryId"], category.id);
    assert_eq!(tree[0]["pages"][0]["notes"][0]["title"], "Titre");
}
