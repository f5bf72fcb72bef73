//! Argument validation shared by every verb handler
//!
//! Checks run in a fixed order and the first failure wins:
//! 1. class name present and non-empty
//! 2. class registered
//! 3. id present, then `"Class.id"` in the table (when `id` is checked)
//! 4. attribute name present, then value present (when `attrs` is checked)

use super::errors::ValidationError;
use crate::model::TypeRegistry;
use crate::storage::{composite_key, StorageTable};

/// Which optional checks to run after the class checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checks {
    pub id: bool,
    pub attrs: bool,
}

impl Checks {
    /// Class name only (`create`, `all <T>`, `count <T>`)
    pub const CLASS: Checks = Checks { id: false, attrs: false };
    /// Class and existing instance (`show`, `destroy`)
    pub const INSTANCE: Checks = Checks { id: true, attrs: false };
    /// Instance plus attribute name and value (`update`)
    pub const ATTRIBUTE: Checks = Checks { id: true, attrs: true };
}

fn present(args: &[String], index: usize) -> Option<&str> {
    args.get(index).map(String::as_str).filter(|s| !s.is_empty())
}

/// Validates a split argument list.
pub fn validate(
    args: &[String],
    registry: &TypeRegistry,
    table: &StorageTable,
    checks: Checks,
) -> Result<(), ValidationError> {
    let class_name = present(args, 0).ok_or(ValidationError::ClassNameMissing)?;

    if !registry.contains(class_name) {
        return Err(ValidationError::ClassDoesNotExist);
    }

    if checks.id {
        let id = present(args, 1).ok_or(ValidationError::InstanceIdMissing)?;
        if !table.contains_key(&composite_key(class_name, id)) {
            return Err(ValidationError::NoInstanceFound);
        }
    }

    if checks.attrs {
        present(args, 2).ok_or(ValidationError::AttributeNameMissing)?;
        present(args, 3).ok_or(ValidationError::ValueMissing)?;
    }

    Ok(())
}
