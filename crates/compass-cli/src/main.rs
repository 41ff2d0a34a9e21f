//! Scene Compass CLI
//!
//! Command-line interface for managing Scene Compass bookmark files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use compass_core::merge::{self, MergeError, MergeReport};
use compass_core::{BookmarkStore, Config, Quat, Vec3};

mod commands;
mod logging;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "compass")]
#[command(about = "Scene Compass - scene bookmarks and groups")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug details to stderr (or the configured log file)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use this bookmark file instead of the configured one
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bookmarks, grouped
    #[command(alias = "ls")]
    List {
        /// Only bookmarks of this scene
        #[arg(long)]
        scene: Option<String>,
        /// Case-insensitive match on name or group
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add a bookmark
    Add {
        #[command(subcommand)]
        command: AddCommands,
    },
    /// Rename a bookmark or move it to another group
    Edit {
        /// Bookmark number as shown by `list`
        index: usize,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New group
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Delete a bookmark
    #[command(alias = "rm")]
    Delete {
        /// Bookmark number as shown by `list`
        index: usize,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// List groups with bookmark counts
    Groups,
    /// Manage groups
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },
    /// Import a bookmark file under the "Sample: " groups
    Import {
        /// File to import (defaults to the configured samples file)
        path: Option<PathBuf>,
    },
    /// Show store location and counts
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum AddCommands {
    /// Save a camera viewpoint
    Camera {
        /// Scene the viewpoint belongs to
        #[arg(long)]
        scene: String,
        /// Camera position as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        position: Vec3,
        /// Camera rotation quaternion as x,y,z,w
        #[arg(
            long,
            value_parser = parse_quat,
            default_value = "0,0,0,1",
            allow_hyphen_values = true
        )]
        rotation: Quat,
        /// Bookmark name (defaults to "Camera View")
        #[arg(short, long, default_value = "")]
        name: String,
        /// Group (defaults to the last used group)
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Save a reference to an object
    Object {
        /// Scene the object lives in
        #[arg(long)]
        scene: String,
        /// Stable object identifier
        #[arg(long)]
        object_ref: String,
        /// Bookmark name
        #[arg(short, long, default_value = "")]
        name: String,
        /// Group (defaults to the last used group)
        #[arg(short, long)]
        group: Option<String>,
    },
}

#[derive(Subcommand)]
enum GroupCommands {
    /// Rename a group
    Rename {
        old: String,
        new: String,
        /// Scene currently in view; asks again if the group reaches beyond it
        #[arg(long)]
        scene: Option<String>,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete a group and all of its bookmarks
    Delete {
        name: String,
        /// Scene currently in view; used to warn about hidden bookmarks
        #[arg(long)]
        scene: Option<String>,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Expand a group (or all groups)
    Expand {
        name: Option<String>,
        #[arg(long, conflicts_with = "name")]
        all: bool,
    },
    /// Collapse a group (or all groups)
    Collapse {
        name: Option<String>,
        #[arg(long, conflicts_with = "name")]
        all: bool,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, samples_path, auto_import_samples, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    logging::init(&config, cli.verbose);

    // Commands that don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    // Merge samples on disk first so the store opens with them
    if config.auto_import_samples && !matches!(cli.command, Commands::Import { .. }) {
        if let Err(e) = auto_import(cli.file.as_deref(), &config) {
            warn!("Sample import skipped: {}", e);
        }
    }

    let mut store = match &cli.file {
        Some(path) => BookmarkStore::open_at(path),
        None => BookmarkStore::open_with_config(&config),
    };

    match cli.command {
        Commands::List { scene, search } => {
            commands::bookmark::list(&store, scene, search, &output)
        }
        Commands::Add { command } => handle_add_command(command, &mut store, &output),
        Commands::Edit { index, name, group } => {
            commands::bookmark::edit(&mut store, index, name, group, &output)
        }
        Commands::Delete { index, yes } => {
            commands::bookmark::delete(&mut store, index, yes, &output)
        }
        Commands::Groups => commands::group::list(&store, &output),
        Commands::Group { command } => handle_group_command(command, &mut store, &output),
        Commands::Import { path } => {
            let path = path.unwrap_or_else(|| config.samples_path());
            commands::import::run(&mut store, &path, &output)
        }
        Commands::Status => commands::status::show(&store, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_add_command(command: AddCommands, store: &mut BookmarkStore, output: &Output) -> Result<()> {
    match command {
        AddCommands::Camera {
            scene,
            position,
            rotation,
            name,
            group,
        } => commands::bookmark::add_camera(store, scene, position, rotation, name, group, output),
        AddCommands::Object {
            scene,
            object_ref,
            name,
            group,
        } => commands::bookmark::add_object(store, scene, object_ref, name, group, output),
    }
}

fn handle_group_command(
    command: GroupCommands,
    store: &mut BookmarkStore,
    output: &Output,
) -> Result<()> {
    match command {
        GroupCommands::Rename {
            old,
            new,
            scene,
            yes,
        } => commands::group::rename(store, old, new, scene, yes, output),
        GroupCommands::Delete { name, scene, yes } => {
            commands::group::delete(store, name, scene, yes, output)
        }
        GroupCommands::Expand { name, all } => {
            commands::group::set_expanded(store, name, all, true, output)
        }
        GroupCommands::Collapse { name, all } => {
            commands::group::set_expanded(store, name, all, false, output)
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Merge the configured sample set into the bookmark file
///
/// The bookmark file is read strictly: if it exists but cannot be read, the
/// import fails and the file is left alone.
fn auto_import(file: Option<&Path>, config: &Config) -> Result<MergeReport, MergeError> {
    match file {
        Some(path) => merge::merge_files(path, &config.samples_path()),
        None => merge::import_samples(config),
    }
}

/// Parse "x,y,z"
fn parse_vec3(s: &str) -> std::result::Result<Vec3, String> {
    match parse_floats(s)?.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z but got '{}'", s)),
    }
}

/// Parse "x,y,z,w"
fn parse_quat(s: &str) -> std::result::Result<Quat, String> {
    match parse_floats(s)?.as_slice() {
        [x, y, z, w] => Ok(Quat::new(*x, *y, *z, *w)),
        _ => Err(format!("expected x,y,z,w but got '{}'", s)),
    }
}

fn parse_floats(s: &str) -> std::result::Result<Vec<f32>, String> {
    s.split(',')
        .map(|part| {
            let part = part.trim();
            match part.parse::<f32>() {
                Ok(value) if value.is_finite() => Ok(value),
                Ok(_) => Err(format!("'{}' is not a finite number", part)),
                Err(e) => Err(format!("invalid number '{}': {}", part, e)),
            }
        })
        .collect()
}
