use crate::error::Result;
use crate::paths;
use crate::task::TaskRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// TaskStore
// ---------------------------------------------------------------------------

/// Persisted mapping from source-file path to the task list last observed in
/// that file. Loaded at the start of every save/sync pass and saved at the
/// end; a missing store file loads as empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStore {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub files: BTreeMap<String, Vec<TaskRecord>>,
    pub last_updated: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            version: 1,
            files: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::store_path(root);
        if !path.exists() {
            return Ok(Self::new());
        }
        let data = std::fs::read_to_string(&path)?;
        let store: TaskStore = serde_yaml::from_str(&data)?;
        Ok(store)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::store_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    pub fn tasks_for(&self, file_key: &str) -> &[TaskRecord] {
        self.files.get(file_key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Replace a file's entry wholesale with the newly observed task list.
    /// Tasks no longer present in the source are dropped here; what happens
    /// to their remote cards is the reconciler's deletion policy.
    pub fn replace(&mut self, file_key: &str, tasks: Vec<TaskRecord>) {
        if tasks.is_empty() {
            self.files.remove(file_key);
        } else {
            self.files.insert(file_key.to_string(), tasks);
        }
        self.last_updated = Utc::now();
    }

    pub fn file_keys(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
