mod image;
mod memory_entry;
mod memory_store;
mod music;
mod slideshow;
mod ui;

use std::path::PathBuf;

use color_eyre::Result;
use memory_entry::MemoryEntry;
use memory_store::MemoryStore;
use ui::{Action, UI};

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    // Missing or corrupt data starts an empty collection instead of failing.
    let mut store = MemoryStore::load();
    let mut ui = UI::new()?;

    loop {
        ui.display(&store)?;

        if let Some(action) = ui.handle_input(&store)? {
            match action {
                Action::Write => {
                    if let Some(draft) = ui.memory_form(None)? {
                        store.add(MemoryEntry::new(
                            draft.title,
                            draft.date,
                            draft.description,
                            draft.image,
                            draft.tags,
                        ))?;
                    }
                }
                Action::Edit(id) => {
                    if let Some(entry) = store.find(&id).cloned() {
                        if let Some(draft) = ui.memory_form(Some(&entry))? {
                            store.update(
                                &id,
                                draft.title,
                                draft.date,
                                draft.description,
                                draft.image,
                                draft.tags,
                            )?;
                        }
                    }
                }
                Action::Delete(id) => {
                    if ui.confirm("Are you sure you want to delete this memory?")? {
                        store.remove(&id)?;
                    }
                }
                Action::ToggleFavorite(id) => store.toggle_favorite(&id)?,
                Action::Search => ui.prompt_search()?,
                Action::ToggleFavoritesFilter => ui.toggle_favorites_filter(),
                Action::Export => {
                    let dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));
                    match store.export_to(&dir) {
                        Ok(path) => ui.alert(&format!("Exported to {}", path.display()))?,
                        Err(e) => ui.alert(&format!("Export failed: {e}"))?,
                    }
                }
                Action::Import => import_memories(&mut ui, &mut store)?,
                Action::Relive => ui.relive(&store)?,
                Action::Quit => break,
            }
        }
    }

    Ok(())
}

fn import_memories(ui: &mut UI, store: &mut MemoryStore) -> Result<()> {
    let Some(path) = ui.prompt_line("Import JSON file path", "")? else {
        return Ok(());
    };
    let path = path.trim();
    if path.is_empty() {
        return Ok(());
    }

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            ui.alert(&format!("Failed to import: {e}"))?;
            return Ok(());
        }
    };
    let imported = match memory_store::parse_import(&raw) {
        Ok(imported) => imported,
        Err(e) => {
            ui.alert(&format!("Failed to import: {e}"))?;
            return Ok(());
        }
    };

    let count = imported.len();
    if let Some(policy) = ui.import_policy()? {
        store.apply_import(imported, policy)?;
        ui.alert(&format!("Imported {count} memories"))?;
    }
    Ok(())
}
