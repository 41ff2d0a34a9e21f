//! Scene Compass Core Library
//!
//! This crate provides the core of Scene Compass, an editor companion that
//! saves camera viewpoints and object references as bookmarks, organizes
//! them into groups, and takes the user back to them later.
//!
//! # Architecture
//!
//! - **Store**: in-memory bookmark list, flushed to one JSON file after
//!   every change
//! - **Scene**: the host editor sits behind the `SceneEnvironment` trait;
//!   the store never moves the camera by itself
//!
//! # Quick Start
//!
//! ```text
//! let mut store = BookmarkStore::open()?;
//!
//! // Save where the camera is looking
//! let bookmark = Navigator::new(&mut env).capture("", &store.last_used_group().to_string())?;
//! store.add(bookmark);
//!
//! // List the current scene's bookmarks
//! let sections = store.grouped(&Filter::scene(env.current_scene_id()));
//! ```
//!
//! # Modules
//!
//! - `store`: bookmark store (main entry point)
//! - `models`: bookmark record and geometry types
//! - `storage`: bookmark file persistence
//! - `scene`: resolving bookmarks against a live editor
//! - `merge`: sample bookmark import
//! - `measure`: distance measuring tool
//! - `config`: application configuration

pub mod config;
pub mod measure;
pub mod merge;
pub mod models;
pub mod scene;
pub mod storage;
pub mod store;

pub use config::Config;
pub use measure::{MeasureState, MeasureTool};
pub use merge::{MergeError, MergeReport, SAMPLE_GROUP_PREFIX};
pub use models::{Bookmark, BookmarkKind, ObjectRef, Pose, Quat, SceneId, Vec3, DEFAULT_GROUP};
pub use scene::{
    AlwaysConfirm, Arrival, MemoryEnvironment, NavigationError, NavigationPolicy, NeverConfirm,
    Navigator, Resolved, SceneEnvironment, Selection,
};
pub use storage::{BookmarkFile, GroupExpansion, StorageError, StoreSnapshot};
pub use store::{BookmarkStore, Entry, EntryId, Filter, GroupScope, GroupView};
