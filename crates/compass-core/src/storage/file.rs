//! Bookmark file persistence
//!
//! Reads and writes the whole store as one pretty-printed JSON document.
//! Writes are atomic (write to temp file, then rename) so a crash never
//! leaves a half-written file behind.
//!
//! Document shape:
//! - `records` - ordered list of bookmarks
//! - `lastUsedGroup` - group preselected for the next add
//! - `groupExpansionStates` - ordered `{groupName, isExpanded}` pairs

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use crate::models::{normalize_group, Bookmark, DEFAULT_GROUP};

/// Persisted UI fold state of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupExpansion {
    pub group_name: String,
    pub is_expanded: bool,
}

impl GroupExpansion {
    pub fn new(group_name: impl Into<String>, is_expanded: bool) -> Self {
        Self {
            group_name: group_name.into(),
            is_expanded,
        }
    }
}

/// Everything that goes into a bookmark file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub records: Vec<Bookmark>,
    #[serde(default = "default_group")]
    pub last_used_group: String,
    #[serde(default)]
    pub group_expansion_states: Vec<GroupExpansion>,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            last_used_group: default_group(),
            group_expansion_states: Vec::new(),
        }
    }
}

impl StoreSnapshot {
    /// Repair fields a hand-edited or foreign file may leave inconsistent
    ///
    /// Records get the same defaults their constructors apply (see
    /// `Bookmark::repaired`), and repeated expansion entries collapse to the
    /// last one, keeping the position of the first.
    fn normalized(mut self) -> Self {
        self.records = self.records.into_iter().map(Bookmark::repaired).collect();
        self.last_used_group = normalize_group(self.last_used_group);

        let mut states: Vec<GroupExpansion> = Vec::with_capacity(self.group_expansion_states.len());
        for state in self.group_expansion_states {
            match states.iter_mut().find(|s| s.group_name == state.group_name) {
                Some(existing) => existing.is_expanded = state.is_expanded,
                None => states.push(state),
            }
        }
        self.group_expansion_states = states;
        self
    }
}

/// Handle on a single bookmark file
#[derive(Debug, Clone)]
pub struct BookmarkFile {
    path: PathBuf,
}

impl BookmarkFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the file exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the file, degrading to an empty snapshot on any failure
    ///
    /// A missing file is the normal first-run case. Unreadable or corrupt
    /// files are logged and treated the same way.
    pub fn load(&self) -> StoreSnapshot {
        match self.try_load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!("No bookmark file at {:?}, starting empty", self.path);
                StoreSnapshot::default()
            }
            Err(e) => {
                warn!("Failed to load bookmarks, starting empty: {}", e);
                StoreSnapshot::default()
            }
        }
    }

    /// Load the file, reporting every failure
    ///
    /// Returns `None` if the file doesn't exist.
    pub fn try_load(&self) -> StorageResult<Option<StoreSnapshot>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::from_read(e, self.path.clone())),
        };

        let snapshot: StoreSnapshot =
            serde_json::from_str(&content).map_err(|e| StorageError::InvalidFormat {
                path: self.path.clone(),
                details: e.to_string(),
            })?;

        debug!(
            "Loaded {} bookmark(s) from {:?}",
            snapshot.records.len(),
            self.path
        );
        Ok(Some(snapshot.normalized()))
    }

    /// Write the snapshot to disk, creating parent directories as needed
    ///
    /// Refuses snapshots with a non-finite pose: they would encode as `null`
    /// and make the whole file unreadable.
    pub fn save(&self, snapshot: &StoreSnapshot) -> StorageResult<()> {
        if let Some(bad) = snapshot.records.iter().find(|r| !r.pose().is_finite()) {
            return Err(StorageError::NonFinitePose {
                path: self.path.clone(),
                name: bad.name.clone(),
            });
        }
        let json = serde_json::to_string_pretty(snapshot).map_err(StorageError::Encode)?;
        atomic_write(&self.path, json.as_bytes())?;
        debug!(
            "Saved {} bookmark(s) to {:?}",
            snapshot.records.len(),
            self.path
        );
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}
