//! Bookmark command handlers

use std::collections::HashMap;

use anyhow::{bail, Result};

use compass_core::{
    Bookmark, BookmarkStore, EntryId, Filter, ObjectRef, Pose, Quat, SceneId, Vec3,
};

use super::{check_saved, entry_at};
use crate::output::Output;
use crate::prompt::confirm;

/// List bookmarks grouped, optionally narrowed to a scene and a search term
pub fn list(
    store: &BookmarkStore,
    scene: Option<String>,
    search: Option<String>,
    output: &Output,
) -> Result<()> {
    let filter = Filter {
        scene_id: scene.map(SceneId::from),
        search: search.unwrap_or_default(),
    };
    let sections = store.grouped(&filter);
    output.print_sections(&sections, &list_numbers(store));
    Ok(())
}

/// Save a camera viewpoint
pub fn add_camera(
    store: &mut BookmarkStore,
    scene: String,
    position: Vec3,
    rotation: Quat,
    name: String,
    group: Option<String>,
    output: &Output,
) -> Result<()> {
    let group = group.unwrap_or_else(|| store.last_used_group().to_string());
    let bookmark = Bookmark::camera_view(
        name,
        group,
        SceneId::from(scene),
        Pose::new(position, rotation),
    );
    add(store, bookmark, output)
}

/// Save an object reference
pub fn add_object(
    store: &mut BookmarkStore,
    scene: String,
    object_ref: String,
    name: String,
    group: Option<String>,
    output: &Output,
) -> Result<()> {
    if object_ref.trim().is_empty() {
        bail!("An object reference needs a non-empty --object-ref");
    }
    let group = group.unwrap_or_else(|| store.last_used_group().to_string());
    let bookmark =
        Bookmark::object_reference(name, group, SceneId::from(scene), ObjectRef::new(object_ref));
    add(store, bookmark, output)
}

fn add(store: &mut BookmarkStore, bookmark: Bookmark, output: &Output) -> Result<()> {
    let id = store.add(bookmark);
    check_saved(store, output);

    let index = store.len();
    if let Some(bookmark) = store.get(id) {
        output.success(&format!(
            "Added '{}' to {} as number {}",
            bookmark.name, bookmark.group, index
        ));
        if !output.is_quiet() {
            output.print_bookmark(index, bookmark);
        }
    }
    Ok(())
}

/// Rename a bookmark or move it to another group
pub fn edit(
    store: &mut BookmarkStore,
    index: usize,
    name: Option<String>,
    group: Option<String>,
    output: &Output,
) -> Result<()> {
    if name.is_none() && group.is_none() {
        bail!("Nothing to change. Pass --name and/or --group.");
    }

    let entry = entry_at(store, index)?;
    let new_name = name.unwrap_or_default();
    let new_group = group.unwrap_or_else(|| entry.bookmark.group.clone());

    store.edit(entry.id, &new_name, &new_group);
    check_saved(store, output);

    if let Some(bookmark) = store.get(entry.id) {
        output.success(&format!("Updated number {}", index));
        if !output.is_quiet() {
            output.print_bookmark(index, bookmark);
        }
    }
    Ok(())
}

/// Delete a bookmark
pub fn delete(store: &mut BookmarkStore, index: usize, yes: bool, output: &Output) -> Result<()> {
    let entry = entry_at(store, index)?;

    if !yes && output.should_prompt() {
        let question = format!(
            "Delete '{}' from {}?",
            entry.bookmark.name, entry.bookmark.group
        );
        if !confirm(&question)? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    if let Some(removed) = store.delete(entry.id) {
        check_saved(store, output);
        output.success(&format!("Deleted '{}'", removed.name));
    }
    Ok(())
}

/// List numbers as shown to the user, keyed by entry
fn list_numbers(store: &BookmarkStore) -> HashMap<EntryId, usize> {
    store
        .entries()
        .into_iter()
        .enumerate()
        .map(|(i, entry)| (entry.id, i + 1))
        .collect()
}
