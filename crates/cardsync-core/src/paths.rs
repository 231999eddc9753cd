use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CARDSYNC_DIR: &str = ".cardsync";

pub const CONFIG_FILE: &str = ".cardsync/config.yaml";
pub const STORE_FILE: &str = ".cardsync/store.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn cardsync_dir(root: &Path) -> PathBuf {
    root.join(CARDSYNC_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn store_path(root: &Path) -> PathBuf {
    root.join(STORE_FILE)
}

/// Canonical store key for a source file: the absolute path, falling back to
/// the path as given when it cannot be canonicalized (e.g. deleted file).
pub fn file_key(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
