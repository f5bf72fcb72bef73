//! In-memory storage table
//!
//! Maps composite keys `"TypeName.id"` to records. Iteration follows
//! first-insertion order; overwriting a key keeps its position, removing
//! a key closes the gap.

use std::collections::HashMap;

use crate::model::Record;

/// Keyed, insertion-ordered table of records
#[derive(Debug, Clone, Default)]
pub struct StorageTable {
    entries: HashMap<String, Record>,
    order: Vec<String>,
}

impl StorageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the entry at the record's own key.
    pub fn insert(&mut self, record: Record) {
        let key = record.key();
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.insert(key, record);
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Record> {
        let record = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in table order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.order
            .iter()
            .filter_map(move |k| self.entries.get(k).map(|r| (k.as_str(), r)))
    }

    /// Records whose key prefix is exactly `type_name`.
    pub fn of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.iter()
            .filter(move |(key, _)| key_type(key) == type_name)
            .map(|(_, record)| record)
    }
}

/// The kind part of a composite key: everything before the first `.`.
pub fn key_type(key: &str) -> &str {
    key.split_once('.').map_or(key, |(type_name, _)| type_name)
}

/// Builds the composite key for a kind and id.
pub fn composite_key(type_name: &str, id: &str) -> String {
    format!("{}.{}", type_name, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttrValue, BASE_MODEL, USER};

    #[test]
    fn test_insert_keeps_first_position_on_overwrite() {
        let mut table = StorageTable::new();
        let mut a = Record::new(&BASE_MODEL);
        let b = Record::new(&USER);
        table.insert(a.clone());
        table.insert(b.clone());

        a.set("name", AttrValue::Str("again".into()));
        table.insert(a.clone());

        let keys: Vec<&str> = table.keys().collect();
        assert_eq!(keys, [a.key(), b.key()]);
        assert_eq!(table.get(&a.key()).unwrap().get("name"), Some(AttrValue::Str("again".into())));
    }

    #[test]
    fn test_remove_closes_gap() {
        let mut table = StorageTable::new();
        let records: Vec<Record> = (0..3).map(|_| Record::new(&BASE_MODEL)).collect();
        for r in &records {
            table.insert(r.clone());
        }

        assert!(table.remove(&records[1].key()).is_some());
        assert!(table.remove(&records[1].key()).is_none());

        let keys: Vec<String> = table.keys().map(str::to_string).collect();
        assert_eq!(keys, [records[0].key(), records[2].key()]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_of_type_is_exact() {
        let mut table = StorageTable::new();
        table.insert(Record::new(&USER));
        table.insert(Record::new(&BASE_MODEL));
        table.insert(Record::new(&USER));

        assert_eq!(table.of_type("User").count(), 2);
        assert_eq!(table.of_type("Use").count(), 0);
    }

    #[test]
    fn test_key_helpers() {
        assert_eq!(key_type("User.1234"), "User");
        assert_eq!(key_type("nodot"), "nodot");
        assert_eq!(composite_key("City", "9"), "City.9");
    }
}
