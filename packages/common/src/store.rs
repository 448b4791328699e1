//! Local snapshot persistence
//!
//! A single bundle (document snapshot plus title, author and theme flag)
//! is written to a key-value location and handed back at session start.

use crate::result::CommonResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything persisted for one editing surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBundle {
    /// Serialized document snapshot
    pub content: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub dark_theme: bool,
    pub saved_at: DateTime<Utc>,
}

/// Storage abstraction for the local snapshot
pub trait SnapshotStore {
    /// Write the bundle, replacing any previous one
    fn save(&mut self, bundle: &SessionBundle) -> CommonResult<()>;

    /// Last written bundle, if any
    fn load(&self) -> CommonResult<Option<SessionBundle>>;
}

/// JSON file on disk
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&mut self, bundle: &SessionBundle) -> CommonResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(bundle)?;
        std::fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "Saved session bundle");
        Ok(())
    }

    fn load(&self) -> CommonResult<Option<SessionBundle>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// In-memory store for testing
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    pub bundle: Option<SessionBundle>,
    pub saves: usize,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&mut self, bundle: &SessionBundle) -> CommonResult<()> {
        self.bundle = Some(bundle.clone());
        self.saves += 1;
        Ok(())
    }

    fn load(&self) -> CommonResult<Option<SessionBundle>> {
        Ok(self.bundle.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> SessionBundle {
        SessionBundle {
            content: "[]".to_string(),
            title: "Notes".to_string(),
            author: "Ada".to_string(),
            dark_theme: true,
            saved_at: Utc::now(),
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSnapshotStore::new(dir.path().join("nested").join("bundle.json"));

        assert!(store.load().unwrap().is_none());

        let saved = bundle();
        store.save(&saved).unwrap();
        assert_eq!(store.load().unwrap(), Some(saved));
    }

    #[test]
    fn test_bundle_uses_camel_case_keys() {
        let json = serde_json::to_string(&bundle()).unwrap();
        assert!(json.contains("\"darkTheme\":true"));
        assert!(json.contains("\"savedAt\""));
    }

    #[test]
    fn test_memory_store_replaces_previous_bundle() {
        let mut store = MemorySnapshotStore::new();
        let mut first = bundle();
        store.save(&first).unwrap();
        first.title = "Renamed".to_string();
        store.save(&first).unwrap();

        assert_eq!(store.saves, 2);
        assert_eq!(store.load().unwrap().unwrap().title, "Renamed");
    }
}
