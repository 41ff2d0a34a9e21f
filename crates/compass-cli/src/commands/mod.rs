//! Command handlers

pub mod bookmark;
pub mod config;
pub mod group;
pub mod import;
pub mod status;

use anyhow::{bail, Result};

use compass_core::{BookmarkStore, Entry};

/// Look up an entry by its 1-based list number
pub(crate) fn entry_at(store: &BookmarkStore, index: usize) -> Result<Entry> {
    let entries = store.entries();
    if index == 0 || index > entries.len() {
        bail!(
            "No bookmark number {} (the store holds {})",
            index,
            entries.len()
        );
    }
    Ok(entries[index - 1].clone())
}

/// Retry a failed write once, then warn with a hint if it still fails
pub(crate) fn check_saved(store: &mut BookmarkStore, output: &crate::output::Output) {
    if !store.has_unsaved_changes() {
        return;
    }
    if let Err(e) = store.flush() {
        output.warn_unsaved(&e.to_string(), e.recovery_suggestion());
    }
}
