//! Record model for modelshell
//!
//! A record is an attribute bag with three built-ins: an immutable `id`,
//! `created_at` set once, and `updated_at` refreshed on every persisted
//! mutation. Kinds add declared defaults only, never behavior.
//!
//! # Invariants
//!
//! - `id` never changes after creation
//! - `updated_at >= created_at`
//! - A record's kind name is its table-key prefix

mod record;
mod registry;
mod value;

pub use record::{Record, RecordError, RecordResult, CLASS_FIELD, PROTECTED_ATTRIBUTES};
pub use registry::{
    FieldDefault, RecordKind, TypeRegistry, AMENITY, BASE_MODEL, CITY, PLACE, REVIEW, STATE, USER,
};
pub use value::{format_timestamp, parse_timestamp, strip_quotes, AttrValue};
