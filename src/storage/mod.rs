//! Storage subsystem for modelshell
//!
//! The storage engine holds the process-wide table of records, keyed by
//! `"TypeName.id"`, and persists it as one JSON snapshot file.
//!
//! # Design Principles
//!
//! - The in-memory table is the source of truth
//! - `save` always writes the whole table, never part of it
//! - Snapshot replacement is atomic (temp file + rename)
//! - A missing file is an empty store; an unreadable one halts startup

mod engine;
mod errors;
mod snapshot;
mod table;

pub use engine::{FileStorage, DEFAULT_STORAGE_PATH};
pub use errors::{StorageError, StorageErrorCode, StorageResult};
pub use snapshot::{read_snapshot, temp_path_for, write_snapshot};
pub use table::{composite_key, key_type, StorageTable};
