//! Status command handler

use anyhow::Result;

use compass_core::{BookmarkKind, BookmarkStore, Config};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &BookmarkStore, config: &Config, output: &Output) -> Result<()> {
    let entries = store.entries();
    let cameras = entries
        .iter()
        .filter(|e| e.bookmark.kind == BookmarkKind::CameraView)
        .count();
    let objects = entries.len() - cameras;
    let groups = store.groups().len();
    let samples_path = config.samples_path();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "bookmarks_file": store.path(),
                    "file_exists": store.path().exists(),
                    "unsaved_changes": store.has_unsaved_changes(),
                    "last_used_group": store.last_used_group(),
                    "samples": {
                        "path": samples_path,
                        "present": samples_path.exists(),
                        "auto_import": config.auto_import_samples
                    },
                    "counts": {
                        "bookmarks": entries.len(),
                        "camera_views": cameras,
                        "object_references": objects,
                        "groups": groups
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.path().display());
        }
        OutputFormat::Human => {
            println!("Scene Compass Status");
            println!("====================");
            println!();
            println!("Store:");
            println!("  File:            {}", store.path().display());
            println!(
                "  On disk:         {}",
                if store.path().exists() { "yes" } else { "not yet written" }
            );
            println!("  Last used group: {}", store.last_used_group());
            println!();
            println!("Samples:");
            println!("  File:        {}", samples_path.display());
            println!(
                "  Present:     {}",
                if samples_path.exists() { "yes" } else { "no" }
            );
            println!("  Auto import: {}", config.auto_import_samples);
            println!();
            println!("Counts:");
            println!("  Bookmarks: {}", entries.len());
            println!("    camera views:      {}", cameras);
            println!("    object references: {}", objects);
            println!("  Groups:    {}", groups);
        }
    }

    Ok(())
}
