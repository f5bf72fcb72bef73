//! File-backed storage engine
//!
//! Owns the storage table and the type registry. The table is the source
//! of truth; the backing file is a snapshot written only by `save`.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::errors::{StorageError, StorageResult};
use super::snapshot::{read_snapshot, write_snapshot};
use super::table::StorageTable;
use crate::model::{Record, TypeRegistry, CLASS_FIELD};
use crate::observability::{log_event_with_fields, Event};

/// Default backing file name.
pub const DEFAULT_STORAGE_PATH: &str = "storage.json";

/// Storage engine over a single JSON snapshot file
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    registry: TypeRegistry,
    objects: StorageTable,
}

impl FileStorage {
    /// Creates an engine with an empty table. Nothing is read from disk.
    pub fn new(path: impl Into<PathBuf>, registry: TypeRegistry) -> Self {
        Self {
            path: path.into(),
            registry,
            objects: StorageTable::new(),
        }
    }

    /// Creates an engine and loads the existing snapshot, if any.
    pub fn open(path: impl Into<PathBuf>, registry: TypeRegistry) -> StorageResult<Self> {
        let mut storage = Self::new(path, registry);
        storage.reload()?;
        Ok(storage)
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The live table.
    pub fn all(&self) -> &StorageTable {
        &self.objects
    }

    pub fn all_mut(&mut self) -> &mut StorageTable {
        &mut self.objects
    }

    /// Inserts or overwrites the entry at `"TypeName.id"`.
    pub fn insert(&mut self, record: Record) {
        debug_assert!(
            self.registry.contains(record.type_name()),
            "record kind {} is not registered",
            record.type_name()
        );
        self.objects.insert(record);
    }

    /// Removes an entry from the table. The file is untouched until `save`.
    pub fn remove(&mut self, key: &str) -> Option<Record> {
        self.objects.remove(key)
    }

    /// Serializes the whole table and replaces the backing file.
    pub fn save(&self) -> StorageResult<()> {
        let mut snapshot = Map::new();
        for (key, record) in self.objects.iter() {
            snapshot.insert(key.to_string(), Value::Object(record.to_mapping()));
        }

        write_snapshot(&self.path, &snapshot)?;

        let count = self.objects.len().to_string();
        let path = self.path.display().to_string();
        log_event_with_fields(Event::StorageSaved, &[("path", &path), ("records", &count)]);
        Ok(())
    }

    /// Loads the backing file into the table.
    ///
    /// A missing file leaves the table as is. Every stored entry must name a
    /// registered kind in its discriminator field and sit under its own key;
    /// anything else is corruption and the table is left untouched.
    ///
    /// Returns the number of records loaded.
    pub fn reload(&mut self) -> StorageResult<usize> {
        let path = self.path.display().to_string();

        let snapshot = match read_snapshot(&self.path) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                log_event_with_fields(
                    Event::StorageReloaded,
                    &[("path", &path), ("records", "0")],
                );
                return Ok(0);
            }
            Err(e) => {
                if e.is_fatal() {
                    log_event_with_fields(
                        Event::StorageCorruption,
                        &[("path", &path), ("reason", e.message())],
                    );
                }
                return Err(e);
            }
        };

        let records = match self.decode(snapshot) {
            Ok(records) => records,
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(
                    Event::StorageCorruption,
                    &[("path", &path), ("reason", &reason)],
                );
                return Err(e);
            }
        };

        let count = records.len();
        for record in records {
            self.objects.insert(record);
        }

        let loaded = count.to_string();
        log_event_with_fields(Event::StorageReloaded, &[("path", &path), ("records", &loaded)]);
        Ok(count)
    }

    fn decode(&self, snapshot: Map<String, Value>) -> StorageResult<Vec<Record>> {
        snapshot
            .into_iter()
            .map(|(key, entry)| self.decode_entry(&key, entry).map_err(|e| e.at_key(key)))
            .collect()
    }

    fn decode_entry(&self, key: &str, entry: Value) -> StorageResult<Record> {
        let Value::Object(mut mapping) = entry else {
            return Err(StorageError::corruption("entry is not a JSON object"));
        };

        let class_name = match mapping.remove(CLASS_FIELD) {
            Some(Value::String(name)) => name,
            Some(_) => {
                return Err(StorageError::corruption(format!(
                    "'{}' is not a string",
                    CLASS_FIELD
                )))
            }
            None => {
                return Err(StorageError::corruption(format!(
                    "missing '{}' field",
                    CLASS_FIELD
                )))
            }
        };

        let kind = self.registry.get(&class_name).ok_or_else(|| {
            StorageError::corruption(format!("unknown class '{}'", class_name))
        })?;

        let record = kind
            .restore(mapping)
            .map_err(|e| StorageError::corruption(e.to_string()))?;

        if record.key() != key {
            return Err(StorageError::corruption(format!(
                "entry belongs under '{}'",
                record.key()
            )));
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttrValue, BASE_MODEL, USER};
    use crate::storage::StorageErrorCode;
    use std::fs;
    use tempfile::TempDir;

    fn storage_in(temp_dir: &TempDir) -> FileStorage {
        FileStorage::new(temp_dir.path().join("storage.json"), TypeRegistry::standard())
    }

    #[test]
    fn test_insert_keys_by_type_and_id() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = storage_in(&temp_dir);

        let record = Record::new(&USER);
        let key = format!("User.{}", record.id());
        storage.insert(record);

        assert!(storage.all().contains_key(&key));
    }

    #[test]
    fn test_save_writes_discriminator_and_iso_timestamps() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = storage_in(&temp_dir);

        let record = Record::new(&BASE_MODEL);
        let key = record.key();
        storage.insert(record);
        storage.save().unwrap();

        let content = fs::read_to_string(storage.path()).unwrap();
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value[&key][CLASS_FIELD], "BaseModel");
        assert!(value[&key]["created_at"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_reload_reproduces_table() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = storage_in(&temp_dir);

        let mut user = Record::new(&USER);
        user.set("email", AttrValue::Str("a@b.com".into()));
        user.set("score", AttrValue::Float(4.5));
        storage.insert(user);
        storage.insert(Record::new(&BASE_MODEL));
        storage.save().unwrap();

        let mut fresh = storage_in(&temp_dir);
        assert_eq!(fresh.reload().unwrap(), 2);

        let before: Vec<_> = storage.all().iter().map(|(k, r)| (k.to_string(), r.clone())).collect();
        let after: Vec<_> = fresh.all().iter().map(|(k, r)| (k.to_string(), r.clone())).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_reload_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = storage_in(&temp_dir);
        assert_eq!(storage.reload().unwrap(), 0);
        assert!(storage.all().is_empty());
    }

    #[test]
    fn test_reload_unknown_class_is_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(
            &path,
            r#"{"Ghost.1": {"id": "1", "created_at": "2017-09-28T21:05:54.119427",
                "updated_at": "2017-09-28T21:05:54.119427", "__class__": "Ghost"}}"#,
        )
        .unwrap();

        let err = FileStorage::open(&path, TypeRegistry::standard()).unwrap_err();
        assert_eq!(err.code(), StorageErrorCode::DataCorruption);
        assert_eq!(err.key(), Some("Ghost.1"));
    }

    #[test]
    fn test_reload_key_mismatch_is_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(
            &path,
            r#"{"User.1": {"id": "1", "__class__": "BaseModel"}}"#,
        )
        .unwrap();

        let err = FileStorage::open(&path, TypeRegistry::standard()).unwrap_err();
        assert!(err.message().contains("BaseModel.1"));
    }

    #[test]
    fn test_failed_reload_leaves_table_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = storage_in(&temp_dir);
        storage.insert(Record::new(&BASE_MODEL));

        fs::write(storage.path(), "not json").unwrap();
        assert!(storage.reload().is_err());
        assert_eq!(storage.all().len(), 1);
    }
}
