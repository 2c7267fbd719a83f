//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notebook_core` linkage and print the crate version.
//! - Seed a demo session and print the sidebar tree.
//!
//! Environment:
//! - `NOTEBOOK_LOG_DIR` (absolute) enables file logging, at
//!   `NOTEBOOK_LOG_LEVEL` or the build-mode default.
//! - `NOTEBOOK_DB_PATH` stores the demo in a SQLite file instead of memory.

use log::error;
use notebook_core::db::{open_db, open_db_in_memory};
use notebook_core::{
    Category, CategoryRepository, Credentials, NoteDraft, NoteRepository, NotebookService,
    SessionService, SqliteCategoryRepository, SqliteNoteRepository, StoreResult,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("notebook_core ping={}", notebook_core::ping());
    println!("notebook_core version={}", notebook_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("NOTEBOOK_LOG_DIR") {
        let level = std::env::var("NOTEBOOK_LOG_LEVEL")
            .unwrap_or_else(|_| notebook_core::default_log_level().to_string());
        notebook_core::init_logging(&level, &log_dir)?;
    }

    let mut session = SessionService::mock();
    let user = session.login(&Credentials::new("demo", "demo"))?;
    println!("logged in as {} <{}>", user.username, user.email);

    let conn = match std::env::var("NOTEBOOK_DB_PATH") {
        Ok(path) => open_db(path)?,
        Err(_) => open_db_in_memory()?,
    };
    let mut store = NotebookService::new(
        SqliteCategoryRepository::try_new(&conn)?,
        SqliteNoteRepository::try_new(&conn)?,
    );
    if store.list_categories()?.is_empty() {
        seed(&mut store)?;
    }

    for category in store.list_categories()? {
        print_category(&category);
    }
    Ok(())
}

fn seed<C: CategoryRepository, N: NoteRepository>(
    store: &mut NotebookService<C, N>,
) -> StoreResult<()> {
    let personnel = store.add_category("Personnel")?;
    let daily = store.add_page(personnel.id, "Notes quotidiennes")?;
    store.add_page(personnel.id, "Idées")?;
    for index in 1..=2 {
        store.create_note(NoteDraft::new(
            daily.key(),
            format!("Note de test {index}"),
            format!("Contenu de la note de test {index}"),
        ))?;
    }
    Ok(())
}

fn print_category(category: &Category) {
    let marker = if category.is_expanded { "v" } else { ">" };
    println!("{marker} [{}] {}", category.id, category.name);
    if !category.is_expanded {
        return;
    }
    for page in &category.pages {
        println!("    [{}] {} ({} notes)", page.id, page.title, page.notes.len());
        for note in &page.notes {
            println!("        #{} {}", note.id, note.title);
        }
    }
}
