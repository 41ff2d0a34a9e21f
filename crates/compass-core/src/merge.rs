//! Sample bookmark import
//!
//! Folds a foreign bookmark file (the bundled sample set, usually) into a
//! user's store. Every imported group is moved under the `"Sample: "`
//! namespace so it can never collide with a user group, and records whose
//! `(name, group)` already exist are skipped. Running the import again is
//! therefore a no-op, even after the user has edited or deleted some of the
//! imported records.
//!
//! Failure policy:
//! - Missing foreign file: nothing to do, not an error
//! - Corrupt foreign file or destination: error, nothing written
//! - Write failure: error, in-memory store untouched

use std::collections::BTreeSet;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{normalize_group, Bookmark};
use crate::storage::{BookmarkFile, GroupExpansion, StorageError, StoreSnapshot};

/// Prefix reserved for imported groups
pub const SAMPLE_GROUP_PREFIX: &str = "Sample: ";

/// Errors that abort an import
#[derive(Error, Debug)]
pub enum MergeError {
    /// The foreign file exists but could not be read or parsed
    #[error("Failed to read bookmarks to import: {0}")]
    Foreign(#[source] StorageError),

    /// The user's bookmark file exists but could not be read or parsed
    #[error("Failed to read existing bookmarks: {0}")]
    Destination(#[source] StorageError),

    /// The merged store could not be written
    #[error("Failed to save merged bookmarks: {0}")]
    Persist(#[source] StorageError),
}

/// What an import did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// The foreign file was not there
    pub source_missing: bool,
    /// Records appended to the store
    pub added: usize,
    /// Records skipped because their name and group already existed
    pub skipped_duplicates: usize,
    /// Groups that did not exist in the store before the import
    pub new_groups: Vec<String>,
}

impl MergeReport {
    pub fn source_missing() -> Self {
        Self {
            source_missing: true,
            ..Self::default()
        }
    }
}

/// Changes an import would make to a store
#[derive(Debug, Clone, Default)]
pub struct MergePlan {
    pub additions: Vec<Bookmark>,
    pub new_states: Vec<GroupExpansion>,
    pub skipped_duplicates: usize,
    new_groups: Vec<String>,
}

impl MergePlan {
    /// True when applying the plan would change nothing
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.new_states.is_empty()
    }

    pub fn report(&self) -> MergeReport {
        MergeReport {
            source_missing: false,
            added: self.additions.len(),
            skipped_duplicates: self.skipped_duplicates,
            new_groups: self.new_groups.clone(),
        }
    }

    /// Append the planned records and fold states to a snapshot
    pub fn apply_to(&self, snapshot: &mut StoreSnapshot) {
        snapshot.records.extend(self.additions.iter().cloned());
        snapshot
            .group_expansion_states
            .extend(self.new_states.iter().cloned());
    }
}

/// Move a group under the sample namespace unless it is already there
///
/// An empty group is the default group, so it becomes "Sample: Default".
pub fn namespaced(group: &str) -> String {
    let group = normalize_group(group.to_string());
    if group.starts_with(SAMPLE_GROUP_PREFIX) {
        group
    } else {
        format!("{}{}", SAMPLE_GROUP_PREFIX, group)
    }
}

/// Work out which foreign records to add to `existing`
///
/// Duplicates inside the foreign set collapse to their first occurrence.
/// New groups get an expanded fold state.
pub fn plan(existing: &StoreSnapshot, foreign: Vec<Bookmark>) -> MergePlan {
    let mut keys: BTreeSet<(String, String)> = existing
        .records
        .iter()
        .map(|b| (b.name.clone(), b.group.clone()))
        .collect();
    let known_groups: BTreeSet<&str> = existing.records.iter().map(|b| b.group.as_str()).collect();
    let mut stated: BTreeSet<String> = existing
        .group_expansion_states
        .iter()
        .map(|s| s.group_name.clone())
        .collect();

    let mut plan = MergePlan::default();
    for mut bookmark in foreign {
        bookmark.group = namespaced(&bookmark.group);

        if stated.insert(bookmark.group.clone()) {
            plan.new_states
                .push(GroupExpansion::new(bookmark.group.clone(), true));
        }

        let key = (bookmark.name.clone(), bookmark.group.clone());
        if !keys.insert(key) {
            debug!(
                "Skipping duplicate bookmark '{}' in '{}'",
                bookmark.name, bookmark.group
            );
            plan.skipped_duplicates += 1;
            continue;
        }

        if !known_groups.contains(bookmark.group.as_str())
            && !plan.new_groups.contains(&bookmark.group)
        {
            plan.new_groups.push(bookmark.group.clone());
        }
        plan.additions.push(bookmark);
    }
    plan
}

/// Read the records of a foreign bookmark file
///
/// Returns `None` if the file doesn't exist.
pub fn read_foreign(path: &Path) -> Result<Option<Vec<Bookmark>>, MergeError> {
    let snapshot = BookmarkFile::new(path)
        .try_load()
        .map_err(MergeError::Foreign)?;

    match snapshot {
        Some(snapshot) => {
            if snapshot.records.is_empty() {
                warn!("Bookmark file {:?} contains no bookmarks", path);
            }
            Ok(Some(snapshot.records))
        }
        None => {
            debug!("No bookmarks to import at {:?}", path);
            Ok(None)
        }
    }
}

/// Merge one bookmark file into another on disk
///
/// Used when no store is open yet. A missing destination counts as empty;
/// a corrupt one aborts so it is never overwritten.
pub fn merge_files(destination: &Path, foreign: &Path) -> Result<MergeReport, MergeError> {
    let Some(records) = read_foreign(foreign)? else {
        return Ok(MergeReport::source_missing());
    };

    let dest_file = BookmarkFile::new(destination);
    let mut snapshot = dest_file
        .try_load()
        .map_err(MergeError::Destination)?
        .unwrap_or_default();

    let plan = plan(&snapshot, records);
    if plan.is_empty() {
        return Ok(plan.report());
    }

    plan.apply_to(&mut snapshot);
    dest_file.save(&snapshot).map_err(MergeError::Persist)?;

    let report = plan.report();
    info!(
        "Imported {} bookmark(s) from {:?} ({} already present)",
        report.added, foreign, report.skipped_duplicates
    );
    Ok(report)
}

/// Merge the configured sample set into the configured store
pub fn import_samples(config: &Config) -> Result<MergeReport, MergeError> {
    merge_files(&config.bookmarks_path(), &config.samples_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ObjectRef, Pose, SceneId, Vec3};
    use crate::store::BookmarkStore;
    use std::fs;
    use tempfile::TempDir;

    fn camera(name: &str, group: &str) -> Bookmark {
        Bookmark::camera_view(
            name,
            group,
            SceneId::from("demo-scene"),
            Pose::new(Vec3::new(0.0, 5.0, -10.0), Default::default()),
        )
    }

    fn write_foreign(dir: &TempDir, records: Vec<Bookmark>) -> std::path::PathBuf {
        let path = dir.path().join("sample-bookmarks.json");
        let snapshot = StoreSnapshot {
            records,
            ..StoreSnapshot::default()
        };
        BookmarkFile::new(&path).save(&snapshot).unwrap();
        path
    }

    fn poi_samples() -> Vec<Bookmark> {
        vec![
            camera("Spawn", "POIs"),
            camera("Tower", "POIs"),
            Bookmark::object_reference(
                "Chest",
                "POIs",
                SceneId::from("demo-scene"),
                ObjectRef::from("chest-1"),
            ),
        ]
    }

    fn keys(store: &BookmarkStore) -> Vec<(String, String)> {
        store
            .entries()
            .iter()
            .map(|e| (e.bookmark.name.clone(), e.bookmark.group.clone()))
            .collect()
    }

    #[test]
    fn test_namespaced() {
        assert_eq!(namespaced("POIs"), "Sample: POIs");
        assert_eq!(namespaced("Sample: POIs"), "Sample: POIs");
        assert_eq!(namespaced(""), "Sample: Default");
    }

    #[test]
    fn test_plan_puts_empty_group_under_sample_default() {
        let mut record = camera("Spawn", "POIs");
        record.group = String::new();

        let plan = plan(&StoreSnapshot::default(), vec![record]);
        assert_eq!(plan.additions[0].group, "Sample: Default");
        assert_eq!(
            plan.new_states,
            vec![GroupExpansion::new("Sample: Default", true)]
        );
    }

    #[test]
    fn test_import_into_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let foreign = write_foreign(&temp_dir, poi_samples());
        let mut store = BookmarkStore::open_at(temp_dir.path().join("bookmarks.json"));

        let report = store.import_from(&foreign).unwrap();
        assert_eq!(report.added, 3);
        assert_eq!(report.new_groups, vec!["Sample: POIs".to_string()]);

        assert_eq!(store.len(), 3);
        assert!(store
            .entries()
            .iter()
            .all(|e| e.bookmark.group == "Sample: POIs"));
        let groups: Vec<String> = store.groups().into_iter().collect();
        assert_eq!(groups, vec!["Default", "Sample: POIs"]);
        assert!(store.is_group_expanded("Sample: POIs"));
        assert_eq!(store.last_used_group(), "Default");
    }

    #[test]
    fn test_import_skips_existing_key() {
        let temp_dir = TempDir::new().unwrap();
        let foreign = write_foreign(&temp_dir, poi_samples());
        let mut store = BookmarkStore::open_at(temp_dir.path().join("bookmarks.json"));
        store.add(camera("Spawn", "Sample: POIs"));

        let report = store.import_from(&foreign).unwrap();
        assert_eq!(report.added, 2);
        assert_eq!(report.skipped_duplicates, 1);

        let spawns = keys(&store)
            .into_iter()
            .filter(|(name, group)| name == "Spawn" && group == "Sample: POIs")
            .count();
        assert_eq!(spawns, 1);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_import_twice_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let foreign = write_foreign(&temp_dir, poi_samples());
        let mut store = BookmarkStore::open_at(temp_dir.path().join("bookmarks.json"));
        store.add(camera("Mine", "Work"));

        store.import_from(&foreign).unwrap();
        let once = store.snapshot();

        let second = store.import_from(&foreign).unwrap();
        assert_eq!(second.added, 0);
        assert_eq!(second.skipped_duplicates, 3);
        assert_eq!(store.snapshot(), once);
    }

    #[test]
    fn test_import_leaves_user_groups_alone() {
        let temp_dir = TempDir::new().unwrap();
        let foreign = write_foreign(
            &temp_dir,
            vec![camera("Spawn", "Work"), camera("Hub", "Sample: Extra")],
        );
        let mut store = BookmarkStore::open_at(temp_dir.path().join("bookmarks.json"));
        store.add(camera("Spawn", "Work"));
        let before = store.entries();

        store.import_from(&foreign).unwrap();
        let after = store.entries();

        assert_eq!(&after[..before.len()], &before[..]);
        for entry in &after[before.len()..] {
            assert!(entry.bookmark.group.starts_with(SAMPLE_GROUP_PREFIX));
        }
        assert_eq!(after.len(), 3);
        assert_eq!(after[1].bookmark.group, "Sample: Work");
        assert_eq!(after[2].bookmark.group, "Sample: Extra");
    }

    #[test]
    fn test_import_after_user_deleted_sample() {
        let temp_dir = TempDir::new().unwrap();
        let foreign = write_foreign(&temp_dir, poi_samples());
        let mut store = BookmarkStore::open_at(temp_dir.path().join("bookmarks.json"));

        store.import_from(&foreign).unwrap();
        store.rename_group("Sample: POIs", "My POIs");

        // Renamed records no longer share a key with the samples
        let report = store.import_from(&foreign).unwrap();
        assert_eq!(report.added, 3);
        assert_eq!(store.group_scope("My POIs", None).total, 3);
    }

    #[test]
    fn test_import_collapses_foreign_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let foreign = write_foreign(&temp_dir, vec![camera("A", "G"), camera("A", "G")]);
        let mut store = BookmarkStore::open_at(temp_dir.path().join("bookmarks.json"));

        let report = store.import_from(&foreign).unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.skipped_duplicates, 1);
    }

    #[test]
    fn test_import_missing_source_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = BookmarkStore::open_at(temp_dir.path().join("bookmarks.json"));
        store.add(camera("A", "G"));
        let before = store.snapshot();

        let report = store
            .import_from(&temp_dir.path().join("missing.json"))
            .unwrap();
        assert!(report.source_missing);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_import_corrupt_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let foreign = temp_dir.path().join("sample-bookmarks.json");
        fs::write(&foreign, "[1, 2").unwrap();
        let mut store = BookmarkStore::open_at(temp_dir.path().join("bookmarks.json"));
        store.add(camera("A", "G"));
        let before = store.snapshot();

        let err = store.import_from(&foreign).unwrap_err();
        assert!(matches!(err, MergeError::Foreign(_)));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_import_unwritable_destination_leaves_store_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let foreign = write_foreign(&temp_dir, poi_samples());
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let mut store = BookmarkStore::open_at(blocker.join("bookmarks.json"));
        let err = store.import_from(&foreign).unwrap_err();

        assert!(matches!(err, MergeError::Persist(_)));
        assert!(store.is_empty());
        assert!(store.expansion_states().is_empty());
    }

    #[test]
    fn test_merge_files_creates_destination() {
        let temp_dir = TempDir::new().unwrap();
        let foreign = write_foreign(&temp_dir, poi_samples());
        let destination = temp_dir.path().join("data").join("bookmarks.json");

        let report = merge_files(&destination, &foreign).unwrap();
        assert_eq!(report.added, 3);

        let again = merge_files(&destination, &foreign).unwrap();
        assert_eq!(again.added, 0);

        let store = BookmarkStore::open_at(&destination);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_merge_files_refuses_corrupt_destination() {
        let temp_dir = TempDir::new().unwrap();
        let foreign = write_foreign(&temp_dir, poi_samples());
        let destination = temp_dir.path().join("bookmarks.json");
        fs::write(&destination, "garbage").unwrap();

        let err = merge_files(&destination, &foreign).unwrap_err();
        assert!(matches!(err, MergeError::Destination(_)));
        assert_eq!(fs::read_to_string(&destination).unwrap(), "garbage");
    }

    #[test]
    fn test_import_samples_uses_config_paths() {
        let temp_dir = TempDir::new().unwrap();
        let foreign = write_foreign(&temp_dir, poi_samples());
        let config = Config {
            data_dir: temp_dir.path().join("data"),
            samples_path: Some(foreign),
            ..Config::default()
        };

        let report = import_samples(&config).unwrap();
        assert_eq!(report.added, 3);
        assert!(config.bookmarks_path().exists());
    }

    #[test]
    fn test_plan_does_not_touch_existing_states() {
        let existing = StoreSnapshot {
            records: vec![],
            last_used_group: "Default".to_string(),
            group_expansion_states: vec![GroupExpansion::new("Sample: POIs", false)],
        };

        let plan = plan(&existing, poi_samples());
        assert!(plan.new_states.is_empty());
        assert_eq!(plan.additions.len(), 3);
    }
}
