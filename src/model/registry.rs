//! Record kinds and the type registry
//!
//! The registry is the only place kind names are known. Validation of
//! console input, construction on `create` and reconstruction on reload
//! all go through it.

use serde_json::{Map, Value};

use super::record::{Record, RecordResult};
use super::value::AttrValue;

/// Class-level default for a declared field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Str(&'static str),
    Int(i64),
    Float(f64),
    List,
}

impl FieldDefault {
    fn to_value(self) -> AttrValue {
        match self {
            FieldDefault::Str(s) => AttrValue::Str(s.to_string()),
            FieldDefault::Int(i) => AttrValue::Int(i),
            FieldDefault::Float(f) => AttrValue::Float(f),
            FieldDefault::List => AttrValue::Json(Value::Array(Vec::new())),
        }
    }
}

/// A registered record kind: its name and declared fields.
///
/// Kinds are constructors. `create` builds a fresh record, `restore`
/// rebuilds one from a stored mapping.
#[derive(Debug, PartialEq)]
pub struct RecordKind {
    name: &'static str,
    fields: &'static [(&'static str, FieldDefault)],
}

impl RecordKind {
    pub const fn new(name: &'static str, fields: &'static [(&'static str, FieldDefault)]) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Class-level default of a declared field.
    pub fn default_for(&self, name: &str) -> Option<AttrValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, default)| default.to_value())
    }

    /// Builds a fresh record of this kind.
    pub fn create(&'static self) -> Record {
        Record::new(self)
    }

    /// Rebuilds a record of this kind from a stored mapping.
    pub fn restore(&'static self, mapping: Map<String, Value>) -> RecordResult<Record> {
        Record::from_mapping(self, mapping)
    }
}

pub static BASE_MODEL: RecordKind = RecordKind::new("BaseModel", &[]);

pub static USER: RecordKind = RecordKind::new(
    "User",
    &[
        ("email", FieldDefault::Str("")),
        ("password", FieldDefault::Str("")),
        ("first_name", FieldDefault::Str("")),
        ("last_name", FieldDefault::Str("")),
    ],
);

pub static STATE: RecordKind = RecordKind::new("State", &[("name", FieldDefault::Str(""))]);

pub static CITY: RecordKind = RecordKind::new(
    "City",
    &[
        ("state_id", FieldDefault::Str("")),
        ("name", FieldDefault::Str("")),
    ],
);

pub static AMENITY: RecordKind = RecordKind::new("Amenity", &[("name", FieldDefault::Str(""))]);

pub static PLACE: RecordKind = RecordKind::new(
    "Place",
    &[
        ("city_id", FieldDefault::Str("")),
        ("user_id", FieldDefault::Str("")),
        ("name", FieldDefault::Str("")),
        ("description", FieldDefault::Str("")),
        ("number_rooms", FieldDefault::Int(0)),
        ("number_bathrooms", FieldDefault::Int(0)),
        ("max_guest", FieldDefault::Int(0)),
        ("price_by_night", FieldDefault::Int(0)),
        ("latitude", FieldDefault::Float(0.0)),
        ("longitude", FieldDefault::Float(0.0)),
        ("amenity_ids", FieldDefault::List),
    ],
);

pub static REVIEW: RecordKind = RecordKind::new(
    "Review",
    &[
        ("place_id", FieldDefault::Str("")),
        ("user_id", FieldDefault::Str("")),
        ("text", FieldDefault::Str("")),
    ],
);

/// Mapping from kind name to kind, in registration order
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    kinds: Vec<&'static RecordKind>,
}

impl TypeRegistry {
    /// Creates a registry with no kinds.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The seven kinds of the application.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for kind in [&BASE_MODEL, &USER, &STATE, &CITY, &AMENITY, &PLACE, &REVIEW] {
            registry.register(kind);
        }
        registry
    }

    /// Adds a kind, replacing any kind registered under the same name.
    pub fn register(&mut self, kind: &'static RecordKind) {
        match self.kinds.iter_mut().find(|k| k.name() == kind.name()) {
            Some(slot) => *slot = kind,
            None => self.kinds.push(kind),
        }
    }

    pub fn get(&self, name: &str) -> Option<&'static RecordKind> {
        self.kinds.iter().copied().find(|k| k.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.iter().map(|k| k.name())
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Builds a fresh record of a registered kind.
    pub fn create(&self, name: &str) -> Option<Record> {
        self.get(name).map(RecordKind::create)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_names() {
        let registry = TypeRegistry::standard();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            ["BaseModel", "User", "State", "City", "Amenity", "Place", "Review"]
        );
    }

    #[test]
    fn test_unknown_kind_is_not_constructed() {
        let registry = TypeRegistry::standard();
        assert!(!registry.contains("Foo"));
        assert!(registry.create("Foo").is_none());
        assert!(registry.create("user").is_none());
    }

    #[test]
    fn test_create_uses_kind_name() {
        let registry = TypeRegistry::standard();
        let record = registry.create("Place").unwrap();
        assert_eq!(record.type_name(), "Place");
        assert_eq!(record.get("number_rooms"), Some(AttrValue::Int(0)));
    }

    #[test]
    fn test_register_extends_registry() {
        static POWER_USER: RecordKind = RecordKind::new("PowerUser", &[]);

        let mut registry = TypeRegistry::standard();
        registry.register(&POWER_USER);
        assert_eq!(registry.len(), 8);
        assert!(registry.contains("PowerUser"));

        registry.register(&POWER_USER);
        assert_eq!(registry.len(), 8);
    }
}
