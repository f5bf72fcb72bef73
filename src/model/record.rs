//! Record: one typed entity with an identifier, two timestamps and an
//! open-ended attribute bag.

use std::fmt;

use chrono::{Local, NaiveDateTime, Timelike};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::registry::RecordKind;
use super::value::{format_timestamp, parse_timestamp, AttrValue};

/// Field carrying the concrete kind in a persisted mapping.
pub const CLASS_FIELD: &str = "__class__";

/// Attributes `set` refuses to touch.
pub const PROTECTED_ATTRIBUTES: [&str; 4] = ["id", "created_at", "updated_at", CLASS_FIELD];

/// Errors raised while rebuilding a record from a stored mapping
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// `id` present but not a string
    #[error("field 'id' must be a string, found {0}")]
    InvalidId(String),

    /// Timestamp field not a parseable ISO-8601 string
    #[error("field '{field}' is not an ISO-8601 timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    /// Stored `updated_at` earlier than `created_at`
    #[error("updated_at {updated_at} precedes created_at {created_at}")]
    TimestampOrder {
        created_at: String,
        updated_at: String,
    },
}

/// Result type for record reconstruction
pub type RecordResult<T> = Result<T, RecordError>;

/// Current local time truncated to microseconds.
fn now() -> NaiveDateTime {
    let ts = Local::now().naive_local();
    let micros = ts.nanosecond() / 1_000;
    ts.with_nanosecond(micros * 1_000).unwrap_or(ts)
}

/// A single stored entity
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: &'static RecordKind,
    id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    /// Instance attributes beyond the three built-ins, in assignment order
    attributes: Vec<(String, AttrValue)>,
}

impl Record {
    /// Creates a fresh record with a new id and both timestamps set to now.
    pub fn new(kind: &'static RecordKind) -> Self {
        let stamp = now();
        Self {
            kind,
            id: Uuid::new_v4().to_string(),
            created_at: stamp,
            updated_at: stamp,
            attributes: Vec::new(),
        }
    }

    /// Rebuilds a record from a persisted mapping.
    ///
    /// A present `id` is adopted, timestamps are parsed back from text and
    /// every other key is kept verbatim. Missing built-ins are generated as
    /// for a fresh record. The discriminator field is ignored if present.
    pub fn from_mapping(kind: &'static RecordKind, mapping: Map<String, Value>) -> RecordResult<Self> {
        let mut record = Self::new(kind);
        let mut created_seen = false;
        let mut updated_seen = false;

        for (key, value) in mapping {
            match key.as_str() {
                "id" => match value {
                    Value::String(id) => record.id = id,
                    other => return Err(RecordError::InvalidId(other.to_string())),
                },
                "created_at" => {
                    record.created_at = stored_timestamp("created_at", &value)?;
                    created_seen = true;
                }
                "updated_at" => {
                    record.updated_at = stored_timestamp("updated_at", &value)?;
                    updated_seen = true;
                }
                CLASS_FIELD => {}
                _ => record.put(key, AttrValue::from_json(value)),
            }
        }

        match (created_seen, updated_seen) {
            (true, false) => record.updated_at = record.created_at,
            (false, true) => record.created_at = record.updated_at,
            _ => {}
        }

        if record.updated_at < record.created_at {
            return Err(RecordError::TimestampOrder {
                created_at: format_timestamp(&record.created_at),
                updated_at: format_timestamp(&record.updated_at),
            });
        }

        Ok(record)
    }

    /// Returns the kind name used as the table-key prefix.
    pub fn type_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Composite table key `"TypeName.id"`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.type_name(), self.id)
    }

    /// Reads an attribute: built-ins first, then instance attributes, then
    /// the kind's declared default.
    pub fn get(&self, name: &str) -> Option<AttrValue> {
        match name {
            "id" => Some(AttrValue::Str(self.id.clone())),
            "created_at" => Some(AttrValue::Timestamp(self.created_at)),
            "updated_at" => Some(AttrValue::Timestamp(self.updated_at)),
            _ => self
                .attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .or_else(|| self.kind.default_for(name)),
        }
    }

    /// Sets an instance attribute.
    ///
    /// Returns false, leaving the record untouched, for protected names.
    pub fn set(&mut self, name: &str, value: AttrValue) -> bool {
        if PROTECTED_ATTRIBUTES.contains(&name) {
            return false;
        }
        self.put(name.to_string(), value);
        true
    }

    fn put(&mut self, name: String, value: AttrValue) {
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Refreshes `updated_at`. Writing to disk is the storage engine's job.
    pub fn touch(&mut self) {
        let stamp = now();
        self.updated_at = stamp.max(self.created_at);
    }

    /// Instance attributes in display order: `id`, `created_at`,
    /// `updated_at`, then the rest in assignment order.
    pub fn instance_attributes(&self) -> Vec<(&str, AttrValue)> {
        let mut out = Vec::with_capacity(self.attributes.len() + 3);
        out.push(("id", AttrValue::Str(self.id.clone())));
        out.push(("created_at", AttrValue::Timestamp(self.created_at)));
        out.push(("updated_at", AttrValue::Timestamp(self.updated_at)));
        out.extend(self.attributes.iter().map(|(k, v)| (k.as_str(), v.clone())));
        out
    }

    /// Flat mapping for persistence: every instance attribute with
    /// timestamps as ISO-8601 text, plus the discriminator field.
    pub fn to_mapping(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (name, value) in self.instance_attributes() {
            map.insert(name.to_string(), value.to_json());
        }
        map.insert(CLASS_FIELD.to_string(), Value::String(self.type_name().to_string()));
        map
    }
}

impl fmt::Display for Record {
    /// `[TypeName] (id) {attribute-mapping}`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ({}) {{", self.type_name(), self.id)?;
        for (i, (name, value)) in self.instance_attributes().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", AttrValue::Str(name.to_string()), value)?;
        }
        f.write_str("}")
    }
}

fn stored_timestamp(field: &'static str, value: &Value) -> RecordResult<NaiveDateTime> {
    value
        .as_str()
        .and_then(parse_timestamp)
        .ok_or_else(|| RecordError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}
