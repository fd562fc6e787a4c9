//! Dot-path field resolution shared by filters and sorts
//!
//! Filter options and sort rules name fields by path ("publisher.official",
//! "auth.type"). Both resolve through [`resolve`] so a declared field means
//! the same thing in either place.

use serde::Serialize;
use serde_json::Value;

/// Walk `path` through nested objects.
///
/// Returns `None` when any segment is missing, when an intermediate value is
/// not an object, or when the final value is `null`. Never panics.
pub fn resolve<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    (!current.is_null()).then_some(current)
}

/// JSON projection of an entity, computed once and shared by every filter
/// and sort evaluation on that entity.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccessor {
    projection: Value,
}

impl FieldAccessor {
    /// Project any serializable entity; an entity that fails to serialize
    /// resolves every path to `None`.
    pub fn new<T: Serialize>(entity: &T) -> Self {
        let projection = match serde_json::to_value(entity) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "[Registry] Entity projection failed");
                Value::Null
            }
        };
        Self { projection }
    }

    pub fn from_value(projection: Value) -> Self {
        Self { projection }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        resolve(&self.projection, path)
    }

    pub fn projection(&self) -> &Value {
        &self.projection
    }
}
