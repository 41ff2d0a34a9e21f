//! Bookmark store
//!
//! The `BookmarkStore` owns the in-memory bookmark list, the group registry
//! and the per-group fold state, and writes the whole thing back to its file
//! after every mutation.
//!
//! ## Identity
//!
//! Bookmarks have no persisted id. The store hands out an `EntryId` for each
//! record it holds so callers can edit or delete one record even when another
//! has identical fields. Ids are only valid for the lifetime of the store
//! and are reassigned by `reload()`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = BookmarkStore::open_with_config(&config);
//!
//! let id = store.add(Bookmark::camera_view("Overlook", "Tour", scene, pose));
//! store.rename_group("Tour", "Walkthrough");
//!
//! for section in store.grouped(&Filter::scene(scene_id)) {
//!     println!("{} ({})", section.name, section.entries.len());
//! }
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::merge::{self, MergeError, MergeReport};
use crate::models::{normalize_group, Bookmark, SceneId, DEFAULT_GROUP};
use crate::storage::{BookmarkFile, GroupExpansion, StorageResult, StoreSnapshot};

/// Session-local handle on one stored bookmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A bookmark together with its handle
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub bookmark: Bookmark,
}

/// Criteria for `BookmarkStore::filter`
///
/// Both criteria must hold. An empty search matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub scene_id: Option<SceneId>,
    pub search: String,
}

impl Filter {
    /// Match every bookmark
    pub fn all() -> Self {
        Self::default()
    }

    /// Match bookmarks belonging to one scene
    pub fn scene(scene_id: impl Into<SceneId>) -> Self {
        Self {
            scene_id: Some(scene_id.into()),
            search: String::new(),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    fn matches(&self, bookmark: &Bookmark, needle: &str) -> bool {
        let scene_ok = self
            .scene_id
            .as_ref()
            .map_or(true, |id| bookmark.scene_id == *id);
        scene_ok && bookmark.matches_search(needle)
    }
}

/// One group section of a filtered listing
#[derive(Debug, Clone, PartialEq)]
pub struct GroupView {
    pub name: String,
    pub expanded: bool,
    pub entries: Vec<Entry>,
}

/// How many records a group holds overall versus inside a scene filter
///
/// Callers use this to decide whether a rename or delete reaches records the
/// user cannot currently see, which calls for an extra confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupScope {
    pub total: usize,
    pub visible: usize,
}

impl GroupScope {
    pub fn spans_hidden(&self) -> bool {
        self.total > self.visible
    }
}

/// In-memory bookmark collection backed by a single file
#[derive(Debug)]
pub struct BookmarkStore {
    entries: Vec<Entry>,
    next_id: u64,
    last_used_group: String,
    expansion: Vec<GroupExpansion>,
    file: BookmarkFile,
    unsaved: bool,
    /// The backing file existed but could not be read, and nothing has been
    /// written over it since
    load_failed: bool,
}

impl BookmarkStore {
    /// Open the store using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(&config))
    }

    /// Open the store at the configured bookmarks path
    pub fn open_with_config(config: &Config) -> Self {
        Self::open_at(config.bookmarks_path())
    }

    /// Open the store backed by a specific file
    ///
    /// Never fails: a missing or unreadable file yields an empty store.
    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        let file = BookmarkFile::new(path);
        let mut store = Self {
            entries: Vec::new(),
            next_id: 0,
            last_used_group: DEFAULT_GROUP.to_string(),
            expansion: Vec::new(),
            file,
            unsaved: false,
            load_failed: false,
        };
        store.reload();
        store
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Discard in-memory state and re-read the backing file
    ///
    /// A missing file yields an empty store. So does an unreadable one, but
    /// the store remembers it and refuses to import over it.
    pub fn reload(&mut self) {
        self.load_failed = false;
        let snapshot = match self.file.try_load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!("No bookmark file at {:?}, starting empty", self.path());
                StoreSnapshot::default()
            }
            Err(e) => {
                warn!("Failed to load bookmarks, starting empty: {}", e);
                self.load_failed = true;
                StoreSnapshot::default()
            }
        };
        self.entries.clear();
        for bookmark in snapshot.records {
            self.push(bookmark);
        }
        self.last_used_group = snapshot.last_used_group;
        self.expansion = snapshot.group_expansion_states;
        self.unsaved = false;
    }

    /// Write the current state to disk
    pub fn flush(&mut self) -> StorageResult<()> {
        self.file.save(&self.snapshot())?;
        self.unsaved = false;
        self.load_failed = false;
        Ok(())
    }

    /// True when the last write failed and memory is ahead of disk
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Copy of everything that would be written to disk
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            records: self.entries.iter().map(|e| e.bookmark.clone()).collect(),
            last_used_group: self.last_used_group.clone(),
            group_expansion_states: self.expansion.clone(),
        }
    }

    // ==================== Records ====================

    /// Append a bookmark and remember its group for the next add
    ///
    /// Duplicates are accepted.
    pub fn add(&mut self, bookmark: Bookmark) -> EntryId {
        let bookmark = bookmark.repaired();
        self.last_used_group = bookmark.group.clone();
        debug!("Adding bookmark '{}' to '{}'", bookmark.name, bookmark.group);
        let id = self.push(bookmark);
        self.persist();
        id
    }

    /// Change the name and group of a bookmark in place
    ///
    /// A blank name keeps the current one; an empty group means "Default".
    /// Returns `false` if the id is unknown.
    pub fn edit(&mut self, id: EntryId, new_name: &str, new_group: &str) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        if !new_name.trim().is_empty() {
            entry.bookmark.name = new_name.to_string();
        }
        entry.bookmark.group = normalize_group(new_group.to_string());
        self.persist();
        true
    }

    /// Remove one bookmark by handle
    pub fn delete(&mut self, id: EntryId) -> Option<Bookmark> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        let removed = self.entries.remove(pos).bookmark;
        debug!("Deleted bookmark '{}'", removed.name);
        self.persist();
        Some(removed)
    }

    pub fn get(&self, id: EntryId) -> Option<&Bookmark> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.bookmark)
    }

    /// All entries in insertion order
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries matching the filter, ordered by group name then insertion
    pub fn filter(&self, filter: &Filter) -> Vec<Entry> {
        let needle = filter.search.to_lowercase();
        let mut matched: Vec<Entry> = self
            .entries
            .iter()
            .filter(|e| filter.matches(&e.bookmark, &needle))
            .cloned()
            .collect();
        // Stable sort keeps insertion order inside each group
        matched.sort_by(|a, b| a.bookmark.group.cmp(&b.bookmark.group));
        matched
    }

    /// Filtered entries folded into group sections
    pub fn grouped(&self, filter: &Filter) -> Vec<GroupView> {
        let mut sections: Vec<GroupView> = Vec::new();
        for entry in self.filter(filter) {
            match sections.last_mut() {
                Some(section) if section.name == entry.bookmark.group => {
                    section.entries.push(entry)
                }
                _ => sections.push(GroupView {
                    name: entry.bookmark.group.clone(),
                    expanded: self.is_group_expanded(&entry.bookmark.group),
                    entries: vec![entry],
                }),
            }
        }
        sections
    }

    // ==================== Groups ====================

    /// Every group in use, plus "Default"
    pub fn groups(&self) -> BTreeSet<String> {
        let mut groups: BTreeSet<String> = self
            .entries
            .iter()
            .map(|e| e.bookmark.group.clone())
            .collect();
        groups.insert(DEFAULT_GROUP.to_string());
        groups
    }

    /// Group names with the number of bookmarks in each
    pub fn group_counts(&self) -> Vec<(String, usize)> {
        self.groups()
            .into_iter()
            .map(|name| {
                let count = self
                    .entries
                    .iter()
                    .filter(|e| e.bookmark.group == name)
                    .count();
                (name, count)
            })
            .collect()
    }

    /// Count a group's records overall and inside an optional scene filter
    pub fn group_scope(&self, name: &str, scene: Option<&SceneId>) -> GroupScope {
        let in_group = self.entries.iter().filter(|e| e.bookmark.group == name);
        let mut total = 0;
        let mut visible = 0;
        for entry in in_group {
            total += 1;
            if scene.map_or(true, |s| entry.bookmark.scene_id == *s) {
                visible += 1;
            }
        }
        GroupScope { total, visible }
    }

    /// Move every bookmark in `old` to `new`
    ///
    /// No-op when the names are equal or `new` is empty. The fold state
    /// follows the group. Returns the number of bookmarks moved.
    pub fn rename_group(&mut self, old: &str, new: &str) -> usize {
        if new.is_empty() || old == new {
            return 0;
        }

        let mut moved = 0;
        for entry in self.entries.iter_mut().filter(|e| e.bookmark.group == old) {
            entry.bookmark.group = new.to_string();
            moved += 1;
        }

        let mut changed = moved > 0;
        if let Some(pos) = self.expansion.iter().position(|s| s.group_name == old) {
            let state = self.expansion.remove(pos);
            self.expansion.retain(|s| s.group_name != new);
            self.expansion
                .insert(pos.min(self.expansion.len()), GroupExpansion::new(new, state.is_expanded));
            changed = true;
        }
        if self.last_used_group == old {
            self.last_used_group = new.to_string();
            changed = true;
        }

        if changed {
            debug!("Renamed group '{}' to '{}' ({} bookmark(s))", old, new, moved);
            self.persist();
        }
        moved
    }

    /// Remove a group and every bookmark in it
    ///
    /// Destructive: callers are expected to have confirmed with the user.
    /// Returns the number of bookmarks removed.
    pub fn delete_group(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.bookmark.group != name);
        let removed = before - self.entries.len();

        let had_state = self.expansion.iter().any(|s| s.group_name == name);
        self.expansion.retain(|s| s.group_name != name);

        if removed > 0 || had_state {
            debug!("Deleted group '{}' ({} bookmark(s))", name, removed);
            self.persist();
        }
        removed
    }

    /// Fold state of a group; groups without a stored state are expanded
    pub fn is_group_expanded(&self, name: &str) -> bool {
        self.expansion
            .iter()
            .find(|s| s.group_name == name)
            .map_or(true, |s| s.is_expanded)
    }

    pub fn set_group_expanded(&mut self, name: &str, expanded: bool) {
        match self.expansion.iter_mut().find(|s| s.group_name == name) {
            Some(state) if state.is_expanded == expanded => return,
            Some(state) => state.is_expanded = expanded,
            None => self.expansion.push(GroupExpansion::new(name, expanded)),
        }
        self.persist();
    }

    /// Expand or collapse every known group
    pub fn set_all_groups_expanded(&mut self, expanded: bool) {
        for name in self.groups() {
            match self.expansion.iter_mut().find(|s| s.group_name == name) {
                Some(state) => state.is_expanded = expanded,
                None => self.expansion.push(GroupExpansion::new(name, expanded)),
            }
        }
        self.persist();
    }

    /// Stored fold states in file order
    pub fn expansion_states(&self) -> &[GroupExpansion] {
        &self.expansion
    }

    /// Group preselected for the next add
    pub fn last_used_group(&self) -> &str {
        &self.last_used_group
    }

    // ==================== Import ====================

    /// Merge a foreign bookmark file into this store
    ///
    /// All-or-nothing: the merged state is written first and only committed
    /// to memory once the write succeeded. A backing file that failed to
    /// load is never overwritten by an import.
    pub fn import_from(&mut self, foreign: &Path) -> Result<MergeReport, MergeError> {
        let Some(records) = merge::read_foreign(foreign)? else {
            return Ok(MergeReport::source_missing());
        };

        if self.load_failed {
            self.file.try_load().map_err(MergeError::Destination)?;
            // Repaired on disk since it was opened
            self.reload();
        }

        let plan = merge::plan(&self.snapshot(), records);
        if plan.is_empty() {
            return Ok(plan.report());
        }

        let mut merged = self.snapshot();
        plan.apply_to(&mut merged);
        self.file.save(&merged).map_err(MergeError::Persist)?;

        let report = plan.report();
        for bookmark in plan.additions {
            self.push(bookmark);
        }
        self.expansion = merged.group_expansion_states;
        self.unsaved = false;
        self.load_failed = false;
        info!(
            "Imported {} bookmark(s) from {:?} ({} already present)",
            report.added, foreign, report.skipped_duplicates
        );
        Ok(report)
    }

    // ==================== Internal ====================

    fn push(&mut self, bookmark: Bookmark) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, bookmark });
        id
    }

    /// Save after a mutation; failures are logged, memory stays authoritative
    fn persist(&mut self) {
        match self.file.save(&self.snapshot()) {
            Ok(()) => {
                self.unsaved = false;
                self.load_failed = false;
            }
            Err(e) => {
                error!("Failed to save bookmarks: {}", e);
                self.unsaved = true;
            }
        }
    }
}
