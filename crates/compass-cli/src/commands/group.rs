//! Group command handlers

use anyhow::{bail, Result};

use compass_core::{BookmarkStore, GroupScope, SceneId};

use super::check_saved;
use crate::output::Output;
use crate::prompt::confirm;

/// List all groups with bookmark counts
pub fn list(store: &BookmarkStore, output: &Output) -> Result<()> {
    let groups = store.group_counts();
    output.print_groups(&groups, |name| store.is_group_expanded(name));
    Ok(())
}

/// Rename a group, moving all of its bookmarks
pub fn rename(
    store: &mut BookmarkStore,
    old: String,
    new: String,
    scene: Option<String>,
    yes: bool,
    output: &Output,
) -> Result<()> {
    if new.is_empty() {
        bail!("The new group name cannot be empty");
    }
    if old == new {
        output.message("Group name unchanged.");
        return Ok(());
    }

    let scope = store.group_scope(&old, scene.map(SceneId::from).as_ref());
    if scope.total == 0 && !store.groups().contains(&old) {
        bail!("Group not found: {}", old);
    }

    if !yes && output.should_prompt() && scope.spans_hidden() {
        let question = format!(
            "'{}' also holds {} bookmark(s) in other scenes. Rename them too?",
            old,
            hidden(scope)
        );
        if !confirm(&question)? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    let moved = store.rename_group(&old, &new);
    check_saved(store, output);
    output.success(&format!(
        "Renamed '{}' to '{}' ({} bookmark(s))",
        old, new, moved
    ));
    Ok(())
}

/// Delete a group together with every bookmark in it
pub fn delete(
    store: &mut BookmarkStore,
    name: String,
    scene: Option<String>,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let scope = store.group_scope(&name, scene.map(SceneId::from).as_ref());
    if scope.total == 0 && !store.groups().contains(&name) {
        bail!("Group not found: {}", name);
    }

    if !yes {
        if !output.should_prompt() {
            bail!("Refusing to delete group '{}' without --yes", name);
        }
        if !confirm(&delete_question(&name, scope))? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    let removed = store.delete_group(&name);
    check_saved(store, output);
    output.success(&format!(
        "Deleted group '{}' ({} bookmark(s))",
        name, removed
    ));
    Ok(())
}

/// Expand or collapse one group, or all of them
pub fn set_expanded(
    store: &mut BookmarkStore,
    name: Option<String>,
    all: bool,
    expanded: bool,
    output: &Output,
) -> Result<()> {
    let verb = if expanded { "Expanded" } else { "Collapsed" };

    match name {
        Some(name) if !all => {
            store.set_group_expanded(&name, expanded);
            check_saved(store, output);
            output.success(&format!("{} '{}'", verb, name));
        }
        None if all => {
            store.set_all_groups_expanded(expanded);
            check_saved(store, output);
            output.success(&format!("{} all groups", verb));
        }
        _ => bail!("Pass a group name or --all"),
    }
    Ok(())
}

fn hidden(scope: GroupScope) -> usize {
    scope.total - scope.visible
}

fn delete_question(name: &str, scope: GroupScope) -> String {
    if scope.spans_hidden() {
        format!(
            "Delete group '{}' and all {} bookmark(s)? {} of them are in other scenes.",
            name,
            scope.total,
            hidden(scope)
        )
    } else {
        format!(
            "Delete group '{}' and its {} bookmark(s)?",
            name, scope.total
        )
    }
}
