//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;

use compass_core::{Bookmark, BookmarkKind, EntryId, GroupView, MergeReport};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single bookmark under its list number
    pub fn print_bookmark(&self, index: usize, bookmark: &Bookmark) {
        match self.format {
            OutputFormat::Human => {
                println!("Number:   {}", index);
                println!("Name:     {}", bookmark.name);
                println!("Group:    {}", bookmark.group);
                println!("Kind:     {}", kind_label(bookmark.kind));
                println!("Scene:    {}", bookmark.scene_id);
                match bookmark.kind {
                    BookmarkKind::CameraView => {
                        let p = bookmark.position;
                        let r = bookmark.rotation;
                        println!("Position: {:.2}, {:.2}, {:.2}", p.x, p.y, p.z);
                        println!("Rotation: {:.3}, {:.3}, {:.3}, {:.3}", r.x, r.y, r.z, r.w);
                    }
                    BookmarkKind::ObjectReference => {
                        println!("Object:   {}", bookmark.object_ref);
                    }
                }
            }
            OutputFormat::Json => print_json(&numbered(index, bookmark)),
            OutputFormat::Quiet => println!("{}", index),
        }
    }

    /// Print group sections; `numbers` maps each entry to its list number
    pub fn print_sections(&self, sections: &[GroupView], numbers: &HashMap<EntryId, usize>) {
        let number = |id: &EntryId| numbers.get(id).copied().unwrap_or_default();

        match self.format {
            OutputFormat::Human => {
                if sections.is_empty() {
                    println!("No bookmarks found.");
                    return;
                }
                let mut total = 0;
                for section in sections {
                    let marker = if section.expanded { "▾" } else { "▸" };
                    println!("{} {} ({})", marker, section.name, section.entries.len());
                    total += section.entries.len();
                    if !section.expanded {
                        continue;
                    }
                    for entry in &section.entries {
                        println!(
                            "  {:>3}. {} {} | {}",
                            number(&entry.id),
                            kind_icon(entry.bookmark.kind),
                            truncate(&entry.bookmark.name, 40),
                            entry.bookmark.scene_id
                        );
                    }
                }
                println!("\n{} bookmark(s)", total);
            }
            OutputFormat::Json => {
                let groups: Vec<_> = sections
                    .iter()
                    .map(|section| {
                        let entries: Vec<_> = section
                            .entries
                            .iter()
                            .map(|e| numbered(number(&e.id), &e.bookmark))
                            .collect();
                        json!({
                            "group": section.name,
                            "expanded": section.expanded,
                            "bookmarks": entries,
                        })
                    })
                    .collect();
                print_json(&groups);
            }
            OutputFormat::Quiet => {
                for entry in sections.iter().flat_map(|s| &s.entries) {
                    println!("{}", number(&entry.id));
                }
            }
        }
    }

    /// Print a list of groups
    pub fn print_groups(&self, groups: &[(String, usize)], expanded: impl Fn(&str) -> bool) {
        match self.format {
            OutputFormat::Human => {
                if groups.is_empty() {
                    println!("No groups found.");
                    return;
                }
                for (name, count) in groups {
                    let state = if expanded(name.as_str()) { "" } else { " [collapsed]" };
                    println!("{} ({}){}", name, count, state);
                }
                println!("\n{} group(s)", groups.len());
            }
            OutputFormat::Json => {
                let json_groups: Vec<_> = groups
                    .iter()
                    .map(|(name, count)| {
                        json!({"name": name, "count": count, "expanded": expanded(name.as_str())})
                    })
                    .collect();
                print_json(&json_groups);
            }
            OutputFormat::Quiet => {
                for (name, _) in groups {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print the outcome of an import
    pub fn print_report(&self, report: &MergeReport) {
        match self.format {
            OutputFormat::Human => {
                if report.source_missing {
                    println!("Nothing to import.");
                    return;
                }
                println!("Imported {} bookmark(s)", report.added);
                if report.skipped_duplicates > 0 {
                    println!("Skipped {} already present", report.skipped_duplicates);
                }
                for group in &report.new_groups {
                    println!("  new group: {}", group);
                }
            }
            OutputFormat::Json => print_json(&json!({
                "source_missing": report.source_missing,
                "added": report.added,
                "skipped_duplicates": report.skipped_duplicates,
                "new_groups": report.new_groups,
            })),
            OutputFormat::Quiet => println!("{}", report.added),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!("{}", json!({"status": "success", "message": message}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning that the store could not be written
    pub fn warn_unsaved(&self, error: &str, hint: Option<&str>) {
        eprintln!("warning: changes are kept in memory only: {}", error);
        if let Some(hint) = hint {
            eprintln!("hint: {}", hint);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

/// Bookmark JSON with its list number alongside
fn numbered(index: usize, bookmark: &Bookmark) -> serde_json::Value {
    let mut value = serde_json::to_value(bookmark).unwrap_or_default();
    if let Some(map) = value.as_object_mut() {
        map.insert("index".to_string(), json!(index));
    }
    value
}

fn kind_label(kind: BookmarkKind) -> &'static str {
    match kind {
        BookmarkKind::CameraView => "camera view",
        BookmarkKind::ObjectReference => "object",
    }
}

fn kind_icon(kind: BookmarkKind) -> &'static str {
    match kind {
        BookmarkKind::CameraView => "[cam]",
        BookmarkKind::ObjectReference => "[obj]",
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
