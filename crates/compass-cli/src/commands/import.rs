//! Import command handler

use std::path::Path;

use anyhow::{Context, Result};

use compass_core::BookmarkStore;

use crate::output::Output;

/// Merge a bookmark file into the store under the sample namespace
pub fn run(store: &mut BookmarkStore, path: &Path, output: &Output) -> Result<()> {
    let report = store
        .import_from(path)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    if report.source_missing {
        output.message(&format!("No bookmark file at {}", path.display()));
        return Ok(());
    }
    output.print_report(&report);
    Ok(())
}
