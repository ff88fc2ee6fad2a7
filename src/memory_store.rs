use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use log::{info, warn};

use crate::memory_entry::MemoryEntry;

const STORAGE_DIR: &str = "vaulted_memories";
const STORAGE_FILE: &str = "memories.json";
const PATH_ENV: &str = "VAULTED_MEMORIES_FILE";

/// The persisted collection, newest first. Every mutation rewrites the whole
/// file in one `fs::write`.
pub struct MemoryStore {
    entries: Vec<MemoryEntry>,
    path: PathBuf,
}

/// What to do with a parsed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPolicy {
    /// Replace the stored collection wholesale.
    Replace,
    /// Put imported entries ahead of the existing ones. Ids are not
    /// de-duplicated in either policy.
    Prepend,
}

pub fn storage_path() -> PathBuf {
    if let Ok(path) = std::env::var(PATH_ENV) {
        return PathBuf::from(path);
    }
    match dirs::data_local_dir() {
        Some(dir) => dir.join(STORAGE_DIR).join(STORAGE_FILE),
        None => PathBuf::from(format!("{STORAGE_DIR}.json")),
    }
}

impl MemoryStore {
    /// Loads the collection from the default location. Missing or corrupt
    /// data falls back to an empty collection rather than failing.
    pub fn load() -> Self {
        Self::load_from(storage_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("ignoring corrupt store at {}: {e}", path.display());
                    Vec::new()
                }
            },
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("could not read store at {}: {e}", path.display());
                }
                Vec::new()
            }
        };
        MemoryStore { entries, path }
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string(&self.entries)?)?;
        Ok(())
    }

    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&MemoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Newest first: new entries go to the front.
    pub fn add(&mut self, entry: MemoryEntry) -> Result<()> {
        self.entries.insert(0, entry);
        self.save()
    }

    /// Replaces everything but `id` and `createdAt`. An unknown id is a
    /// silent no-op.
    pub fn update(
        &mut self,
        id: &str,
        title: String,
        date: String,
        description: String,
        image: Option<String>,
        tags: Vec<String>,
    ) -> Result<()> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.title = title;
            entry.date = date;
            entry.description = description;
            entry.image = image;
            entry.tags = tags;
            self.save()?;
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<()> {
        self.entries.retain(|e| e.id != id);
        self.save()
    }

    pub fn toggle_favorite(&mut self, id: &str) -> Result<()> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.favorite = !entry.favorite;
            self.save()?;
        }
        Ok(())
    }

    /// Pretty-printed JSON of the full collection, active filters ignored.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Writes the export next to the given directory, named with today's
    /// date, and returns the path.
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        let name = format!("vaulted_memories_{}.json", Local::now().format("%Y-%m-%d"));
        let path = dir.join(name);
        fs::write(&path, self.export_json()?)?;
        info!("exported {} memories to {}", self.entries.len(), path.display());
        Ok(path)
    }

    pub fn apply_import(&mut self, imported: Vec<MemoryEntry>, policy: ImportPolicy) -> Result<()> {
        info!("importing {} memories ({policy:?})", imported.len());
        match policy {
            ImportPolicy::Replace => self.entries = imported,
            ImportPolicy::Prepend => {
                let mut merged = imported;
                merged.append(&mut self.entries);
                self.entries = merged;
            }
        }
        self.save()
    }
}

/// Parses an import payload. The top level must be a JSON array; any other
/// shape is rejected before the store is touched.
pub fn parse_import(raw: &str) -> Result<Vec<MemoryEntry>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| eyre!("Invalid file: {e}"))?;
    if !value.is_array() {
        return Err(eyre!("Invalid file: expected a JSON array of memories"));
    }
    serde_json::from_value(value).map_err(|e| eyre!("Invalid file: {e}"))
}

/// Case-insensitive substring match over title, description and tags,
/// AND-combined with the favorites-only flag. Pure: recomputed from the full
/// collection on every render, never persisted.
pub fn filter_entries<'a>(
    entries: &'a [MemoryEntry],
    query: &str,
    favorites_only: bool,
) -> Vec<&'a MemoryEntry> {
    let query = query.trim().to_lowercase();
    entries
        .iter()
        .filter(|m| !favorites_only || m.favorite)
        .filter(|m| {
            if query.is_empty() {
                return true;
            }
            let haystack = format!("{} {} {}", m.title, m.description, m.tags.join(" "));
            haystack.to_lowercase().contains(&query)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, favorite: bool) -> MemoryEntry {
        let mut e = MemoryEntry::new(
            title.into(),
            "2026-01-05".into(),
            format!("description of {title}"),
            None,
            vec!["trip".into()],
        );
        e.favorite = favorite;
        e
    }

    fn temp_store() -> (tempfile::TempDir, MemoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load_from(dir.path().join("memories.json"));
        (dir, store)
    }

    #[test]
    fn create_then_load_puts_newest_first() {
        let (dir, mut store) = temp_store();
        store.add(entry("first", false)).unwrap();
        store.add(entry("second", false)).unwrap();
        let reloaded = MemoryStore::load_from(dir.path().join("memories.json"));
        assert_eq!(reloaded.entries()[0].title, "second");
        assert_eq!(reloaded.entries()[1].title, "first");
    }

    #[test]
    fn delete_then_load_drops_the_id() {
        let (dir, mut store) = temp_store();
        let doomed = entry("doomed", false);
        let id = doomed.id.clone();
        store.add(entry("kept", false)).unwrap();
        store.add(doomed).unwrap();
        store.remove(&id).unwrap();
        let reloaded = MemoryStore::load_from(dir.path().join("memories.json"));
        assert!(reloaded.entries().iter().all(|e| e.id != id));
        assert_eq!(reloaded.entries().len(), 1);
    }

    #[test]
    fn update_replaces_fields_but_not_id_or_created_at() {
        let (_dir, mut store) = temp_store();
        let original = entry("before", false);
        let id = original.id.clone();
        let created_at = original.created_at.clone();
        store.add(original).unwrap();
        store
            .update(
                &id,
                "after".into(),
                "2026-02-01".into(),
                "new description".into(),
                None,
                vec![],
            )
            .unwrap();
        let updated = store.find(&id).unwrap();
        assert_eq!(updated.title, "after");
        assert_eq!(updated.created_at, created_at);
    }

    #[test]
    fn update_of_unknown_id_is_a_no_op() {
        let (_dir, mut store) = temp_store();
        store.add(entry("only", false)).unwrap();
        store
            .update("missing", "x".into(), "2026-01-01".into(), "y".into(), None, vec![])
            .unwrap();
        assert_eq!(store.entries()[0].title, "only");
    }

    #[test]
    fn favorite_toggle_twice_is_identity() {
        let (_dir, mut store) = temp_store();
        let e = entry("toggled", false);
        let id = e.id.clone();
        store.add(e).unwrap();
        store.toggle_favorite(&id).unwrap();
        assert!(store.find(&id).unwrap().favorite);
        store.toggle_favorite(&id).unwrap();
        assert!(!store.find(&id).unwrap().favorite);
    }

    #[test]
    fn export_then_replace_import_round_trips() {
        let (_dir, mut store) = temp_store();
        store.add(entry("one", true)).unwrap();
        store.add(entry("two", false)).unwrap();
        let snapshot = store.entries().to_vec();
        let exported = store.export_json().unwrap();
        let imported = parse_import(&exported).unwrap();
        store.apply_import(imported, ImportPolicy::Replace).unwrap();
        assert_eq!(store.entries(), &snapshot[..]);
    }

    #[test]
    fn prepend_import_keeps_imported_entries_ahead() {
        let (_dir, mut store) = temp_store();
        store.add(entry("existing", false)).unwrap();
        let imported = vec![entry("imported-a", false), entry("imported-b", false)];
        store.apply_import(imported, ImportPolicy::Prepend).unwrap();
        let titles: Vec<_> = store.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["imported-a", "imported-b", "existing"]);
    }

    #[test]
    fn import_rejects_non_array_payloads() {
        assert!(parse_import(r#"{"not":"an array"}"#).is_err());
        assert!(parse_import("42").is_err());
        assert!(parse_import("not json at all").is_err());
        assert!(parse_import("[]").unwrap().is_empty());
    }

    #[test]
    fn corrupt_store_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memories.json");
        fs::write(&path, "{{{{ definitely not json").unwrap();
        let store = MemoryStore::load_from(path);
        assert!(store.is_empty());
    }

    #[test]
    fn missing_store_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load_from(dir.path().join("nope.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn filter_composes_query_and_favorites() {
        let entries = vec![entry("Paris trip", true), entry("Home", false)];
        let hits = filter_entries(&entries, "Paris", true);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Paris trip");
        assert!(filter_entries(&entries, "Tokyo", true).is_empty());
        assert_eq!(filter_entries(&entries, "", false).len(), 2);
        assert_eq!(filter_entries(&entries, "", true).len(), 1);
    }

    #[test]
    fn filter_matches_tags_and_description() {
        let entries = vec![entry("Untagged title", false)];
        assert_eq!(filter_entries(&entries, "TRIP", false).len(), 1);
        assert_eq!(filter_entries(&entries, "description", false).len(), 1);
        assert!(filter_entries(&entries, "absent", false).is_empty());
    }
}
