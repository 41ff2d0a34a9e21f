//! Storage layer
//!
//! Persists the bookmark store as a single JSON file.
//!
//! ## Failure policy
//!
//! - **Load**: soft. A missing, unreadable, or corrupt file yields an empty
//!   store and a log line; `try_load` exposes the error for callers that must
//!   not overwrite a damaged file.
//! - **Save**: returns a typed error; the store logs it and keeps its
//!   in-memory state.

pub mod error;
pub mod file;

pub use error::{StorageError, StorageResult};
pub use file::{BookmarkFile, GroupExpansion, StoreSnapshot};
