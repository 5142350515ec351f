//! Throwaway SQLite databases for tests.
use std::path::{Path, PathBuf};

pub use tempfile::TempDir;

/// An empty private directory, removed on drop.
pub fn temp_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("tasks-test-")
        .tempdir()
        .expect("create temp dir")
}

/// A SQLite file inside a private temporary directory, removed on drop.
pub struct TempDatabase {
    _dir: TempDir,
    path: PathBuf,
    url: String,
}

impl TempDatabase {
    pub fn new() -> Self {
        let dir = temp_dir();
        let path = dir.path().join("tasks.db");
        let url = format!("sqlite://{}?mode=rwc", path.to_string_lossy());
        Self {
            _dir: dir,
            path,
            url,
        }
    }

    pub fn dir(&self) -> &Path {
        self._dir.path()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for TempDatabase {
    fn default() -> Self {
        Self::new()
    }
}
