//! Draft persistence
//!
//! Every edit writes the current payload under a fixed key so an interrupted
//! session can be restored. Writes are best effort: a failing store only
//! logs, editing carries on.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Key/value storage for unsaved drafts.
pub trait DraftStore: Send {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str);
}

/// In-memory store, lost when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryDraftStore {
    entries: HashMap<String, String>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a single draft.
    pub fn with_draft(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.write(key, value);
        store
    }
}

impl DraftStore for MemoryDraftStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// One `<key>.md` file per draft inside a directory.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileDraftStore { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.md"))
    }
}

impl DraftStore for FileDraftStore {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&mut self, key: &str, value: &str) {
        let path = self.path_for(key);
        let result = fs::create_dir_all(&self.dir).and_then(|_| fs::write(&path, value));
        if let Err(err) = result {
            tracing::warn!(path = %path.display(), error = %err, "could not write draft");
        }
    }
}
