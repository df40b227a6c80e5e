use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fslock::LockFile;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{BlogError, Result};
use crate::model::{Post, User};

/// Both tables, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    pub users: Vec<User>,

    #[serde(default)]
    pub posts: Vec<Post>,
}

/// Identifies one version of the data file. Every save replaces the file,
/// so a different stamp means another writer committed in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FileStamp {
    modified: SystemTime,
    len: u64,
}

/// JSON file holding the last committed [`Tables`].
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stamp of the file on disk, `None` while it does not exist.
    pub fn stamp(&self) -> Result<Option<FileStamp>> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(FileStamp {
                modified: meta.modified()?,
                len: meta.len(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads the tables, or empty tables when the file does not exist yet.
    ///
    /// The stamp is taken before reading: if the file is replaced mid-read,
    /// the next [`Snapshot::stamp`] check sees a change and reloads.
    pub fn load(&self) -> Result<(Tables, Option<FileStamp>)> {
        let stamp = self.stamp()?;
        if stamp.is_none() {
            return Ok((Tables::default(), None));
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok((Tables::default(), stamp));
        }
        Ok((serde_json::from_str(&content)?, stamp))
    }

    /// Writes the tables and returns the stamp of the new file.
    pub fn save(&self, tables: &Tables) -> Result<Option<FileStamp>> {
        let content = serde_json::to_string_pretty(tables)?;
        atomic_write(&self.path, &content)?;
        self.stamp()
    }

    /// Blocks until this process holds the writer lock for the data file.
    ///
    /// The lock lives in a sibling `<file>.lock` and is released on drop.
    pub fn lock(&self) -> Result<LockFile> {
        let mut lock_path = self.path.clone().into_os_string();
        lock_path.push(".lock");
        let lock_path = PathBuf::from(lock_path);
        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut lock = LockFile::open(&lock_path).map_err(|e| {
            BlogError::Storage(format!("Failed to open {}: {}", lock_path.display(), e))
        })?;
        lock.lock().map_err(|e| {
            BlogError::Storage(format!("Failed to lock {}: {}", lock_path.display(), e))
        })?;
        Ok(lock)
    }
}

/// Atomically write content to a file using temp file + rename
fn atomic_write(target_path: &Path, content: &str) -> Result<()> {
    let target_dir = match target_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(target_dir)?;

    // Temp file must live in the target directory for the rename to be atomic
    let mut temp_file = NamedTempFile::new_in(target_dir)
        .map_err(|e| BlogError::Storage(format!("Failed to create temp file: {}", e)))?;

    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| BlogError::Storage(format!("Failed to write to temp file: {}", e)))?;

    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| BlogError::Storage(format!("Failed to sync temp file: {}", e)))?;

    temp_file
        .persist(target_path)
        .map_err(|e| BlogError::Storage(format!("Failed to persist temp file: {}", e)))?;

    Ok(())
}
