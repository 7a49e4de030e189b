//! Persistence of the editor state in a small key-value store.
//!
//! Values are stored JSON-encoded under fixed keys, with a version stamp.
//! Storage failures are logged and reported as `false`/`None`; they never
//! interrupt editing.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::ResumeDocument;
use crate::templates::TemplateId;
use crate::Result;

pub mod keys {
    pub const RESUME_DATA: &str = "resumeData";
    pub const SELECTED_TEMPLATE: &str = "selectedTemplate";
    pub const LAST_EDITED: &str = "lastEdited";
    pub const VERSION: &str = "resumeBuilderVersion";

    pub const ALL: [&str; 4] = [RESUME_DATA, SELECTED_TEMPLATE, LAST_EDITED, VERSION];
}

/// Bumped whenever the stored document shape changes; stored data with any
/// other version is ignored.
pub const CURRENT_VERSION: &str = "1.0";

/// String key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Store `value` as JSON under `key`. Returns whether it was saved.
pub fn save_data<T: Serialize + ?Sized>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> bool {
    let result = serde_json::to_string(value)
        .map_err(crate::Error::from)
        .and_then(|json| store.set(key, &json));
    match result {
        Ok(()) => true,
        Err(e) => {
            log::error!("error saving '{key}': {e}");
            false
        }
    }
}

/// Load and decode the value under `key`; `None` when absent or unreadable.
pub fn load_data<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::error!("error loading '{key}': {e}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("error decoding '{key}': {e}");
            None
        }
    }
}

pub fn remove_data(store: &mut dyn KeyValueStore, key: &str) -> bool {
    match store.remove(key) {
        Ok(()) => true,
        Err(e) => {
            log::error!("error removing '{key}': {e}");
            false
        }
    }
}

/// Everything the editor restores on start-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeState {
    pub resume_data: ResumeDocument,
    pub selected_template: TemplateId,
    pub last_edited: Option<DateTime<Utc>>,
}

impl ResumeState {
    fn fresh(default_doc: &ResumeDocument, default_template: TemplateId) -> Self {
        Self {
            resume_data: default_doc.clone(),
            selected_template: default_template,
            last_edited: None,
        }
    }
}

/// Save document, template, edit time (now) and version.
pub fn save_resume_state(store: &mut dyn KeyValueStore, doc: &ResumeDocument, template: TemplateId) {
    save_resume_state_at(store, doc, template, Utc::now());
}

pub fn save_resume_state_at(
    store: &mut dyn KeyValueStore,
    doc: &ResumeDocument,
    template: TemplateId,
    edited: DateTime<Utc>,
) {
    save_data(store, keys::RESUME_DATA, doc);
    save_data(store, keys::SELECTED_TEMPLATE, &template);
    save_data(store, keys::LAST_EDITED, &edited);
    save_data(store, keys::VERSION, CURRENT_VERSION);
}

/// Restore the saved state. A missing or different version stamp discards
/// everything in favour of the defaults; individual unreadable keys fall
/// back to their default.
pub fn load_resume_state(
    store: &dyn KeyValueStore,
    default_doc: &ResumeDocument,
    default_template: TemplateId,
) -> ResumeState {
    let version: Option<String> = load_data(store, keys::VERSION);
    if version.as_deref() != Some(CURRENT_VERSION) {
        log::info!("stored version {version:?} != {CURRENT_VERSION}, starting fresh");
        return ResumeState::fresh(default_doc, default_template);
    }

    ResumeState {
        resume_data: load_data(store, keys::RESUME_DATA).unwrap_or_else(|| default_doc.clone()),
        selected_template: load_data(store, keys::SELECTED_TEMPLATE).unwrap_or(default_template),
        last_edited: load_data(store, keys::LAST_EDITED),
    }
}

/// Remove every key this module writes.
pub fn clear_all(store: &mut dyn KeyValueStore) {
    for key in keys::ALL {
        remove_data(store, key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_doc() -> ResumeDocument {
        let mut doc = ResumeDocument::default();
        doc.personal.name = "Ada Lovelace".into();
        doc.skills = vec!["Mathematics".into()];
        doc
    }

    #[test]
    fn roundtrip_through_memory() {
        let mut store = MemoryStore::new();
        let when = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        save_resume_state_at(&mut store, &sample_doc(), TemplateId::Modern, when);

        let state = load_resume_state(&store, &ResumeDocument::default(), TemplateId::Classic);
        assert_eq!(state.resume_data, sample_doc());
        assert_eq!(state.selected_template, TemplateId::Modern);
        assert_eq!(state.last_edited, Some(when));
    }

    #[test]
    fn version_is_stored_json_encoded() {
        let mut store = MemoryStore::new();
        save_resume_state(&mut store, &sample_doc(), TemplateId::Classic);
        assert_eq!(store.get(keys::VERSION).unwrap().as_deref(), Some("\"1.0\""));
        assert_eq!(
            store.get(keys::SELECTED_TEMPLATE).unwrap().as_deref(),
            Some("\"classic\"")
        );
    }

    #[test]
    fn version_mismatch_yields_defaults() {
        let mut store = MemoryStore::new();
        save_resume_state(&mut store, &sample_doc(), TemplateId::Creative);
        store.set(keys::VERSION, "\"0.9\"").unwrap();

        let state = load_resume_state(&store, &ResumeDocument::default(), TemplateId::Classic);
        assert_eq!(state.resume_data, ResumeDocument::default());
        assert_eq!(state.selected_template, TemplateId::Classic);
        assert!(state.last_edited.is_none());
    }

    #[test]
    fn corrupt_values_fall_back_per_key() {
        let mut store = MemoryStore::new();
        save_resume_state(&mut store, &sample_doc(), TemplateId::Minimal);
        store.set(keys::RESUME_DATA, "{not json").unwrap();
        store.set(keys::SELECTED_TEMPLATE, "\"retro\"").unwrap();

        let state = load_resume_state(&store, &ResumeDocument::default(), TemplateId::Classic);
        assert_eq!(state.resume_data, ResumeDocument::default());
        assert_eq!(state.selected_template, TemplateId::Classic);
        assert!(state.last_edited.is_some());
    }

    #[test]
    fn file_store_persists_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("state"));
        save_resume_state(&mut store, &sample_doc(), TemplateId::Professional);
        assert!(dir.path().join("state").join("resumeData.json").exists());

        let reopened = FileStore::new(dir.path().join("state"));
        let state = load_resume_state(&reopened, &ResumeDocument::default(), TemplateId::Classic);
        assert_eq!(state.selected_template, TemplateId::Professional);

        clear_all(&mut store);
        for key in keys::ALL {
            assert_eq!(store.get(key).unwrap(), None);
        }
        // Removing again is not an error.
        assert!(remove_data(&mut store, keys::VERSION));
    }
}
