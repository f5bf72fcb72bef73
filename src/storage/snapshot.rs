//! Snapshot file I/O
//!
//! The backing file is one JSON object mapping composite keys to record
//! mappings. Writes go through a temp file:
//! 1. Write full snapshot to `<file>.tmp`
//! 2. fsync temp file
//! 3. Rename temp over the backing file
//!
//! A reader therefore sees either the previous snapshot or the new one.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::errors::{StorageError, StorageErrorCode, StorageResult};

/// Path of the temp file used while writing `path`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically replaces the file at `path` with `snapshot`.
pub fn write_snapshot(path: &Path, snapshot: &Map<String, Value>) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            StorageError::io(
                StorageErrorCode::StorageIoError,
                format!("Failed to create storage directory: {}", parent.display()),
                e,
            )
        })?;
    }

    let content = serde_json::to_vec(snapshot).map_err(|e| {
        StorageError::unwritable(format!("Failed to serialize snapshot: {}", e))
    })?;

    let temp_path = temp_path_for(path);
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| {
            StorageError::io(
                StorageErrorCode::StorageWriteFailed,
                format!("Failed to create temp file: {}", temp_path.display()),
                e,
            )
        })?;

    if let Err(e) = file.write_all(&content).and_then(|_| file.sync_all()) {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::io(
            StorageErrorCode::StorageWriteFailed,
            format!("Failed to write snapshot: {}", temp_path.display()),
            e,
        ));
    }
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StorageError::io(
            StorageErrorCode::StorageWriteFailed,
            format!("Failed to commit snapshot: {}", path.display()),
            e,
        )
    })?;

    // Make the rename durable
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

/// Reads the snapshot at `path`.
///
/// Returns `Ok(None)` when the file does not exist. A file that exists but
/// is not a JSON object is corruption.
pub fn read_snapshot(path: &Path) -> StorageResult<Option<Map<String, Value>>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StorageError::io(
                StorageErrorCode::StorageReadFailed,
                format!("Failed to read storage file: {}", path.display()),
                e,
            ))
        }
    };

    let value: Value = serde_json::from_str(&content).map_err(|e| {
        StorageError::corruption(format!(
            "Storage file {} is not valid JSON: {}",
            path.display(),
            e
        ))
    })?;

    match value {
        Value::Object(map) => Ok(Some(map)),
        other => Err(StorageError::corruption(format!(
            "Storage file {} must hold a JSON object, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_snapshot(&temp_dir.path().join("storage.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("storage.json");

        let snapshot = json!({"BaseModel.1": {"id": "1", "__class__": "BaseModel"}});
        write_snapshot(&path, snapshot.as_object().unwrap()).unwrap();

        let read = read_snapshot(&path).unwrap().unwrap();
        assert_eq!(Value::Object(read), snapshot);
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_invalid_json_is_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(&path, "{\"BaseModel.1\": ").unwrap();

        let err = read_snapshot(&path).unwrap_err();
        assert_eq!(err.code(), StorageErrorCode::DataCorruption);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_non_object_is_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(&path, "[1, 2]").unwrap();

        let err = read_snapshot(&path).unwrap_err();
        assert!(err.message().contains("an array"));
    }

    #[test]
    fn test_temp_path_sits_beside_target() {
        assert_eq!(
            temp_path_for(Path::new("/data/storage.json")),
            PathBuf::from("/data/storage.json.tmp")
        );
        assert_eq!(
            temp_path_for(Path::new("storage.json")),
            PathBuf::from("storage.json.tmp")
        );
    }
}
