//! # Property Model
//!
//! Per-element key/value bag with reserved-key enforcement.
//!
//! The bag itself is passive. Index notification on mutation is done by the
//! graph, which owns both the element and the automatic indices.

use crate::primitives::{ID_KEY, LABEL_KEY};
use crate::{ElementKind, GraphError, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reject keys that cannot be set through generic property mutation.
///
/// `"id"` is reserved on every element, `"label"` only on edges.
pub fn check_key(kind: ElementKind, key: &str) -> Result<(), GraphError> {
    let reserved = key == ID_KEY || (key == LABEL_KEY && kind == ElementKind::Edge);
    if reserved {
        return Err(GraphError::ReservedKey {
            key: key.to_string(),
            kind,
        });
    }
    Ok(())
}

/// Mutable key/value properties of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    entries: BTreeMap<String, Value>,
}

impl Properties {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// All keys currently set, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All entries, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Store `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Remove `key`, returning the value it held.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_reserved_everywhere() {
        assert!(matches!(
            check_key(ElementKind::Vertex, "id"),
            Err(GraphError::ReservedKey { .. })
        ));
        assert!(matches!(
            check_key(ElementKind::Edge, "id"),
            Err(GraphError::ReservedKey { .. })
        ));
    }

    #[test]
    fn label_is_reserved_on_edges_only() {
        assert!(check_key(ElementKind::Vertex, "label").is_ok());
        assert!(matches!(
            check_key(ElementKind::Edge, "label"),
            Err(GraphError::ReservedKey { .. })
        ));
    }

    #[test]
    fn ordinary_keys_pass() {
        assert!(check_key(ElementKind::Vertex, "name").is_ok());
        assert!(check_key(ElementKind::Edge, "weight").is_ok());
        // Reservation is exact, not case-insensitive.
        assert!(check_key(ElementKind::Edge, "Label").is_ok());
    }

    #[test]
    fn insert_returns_previous_value() {
        let mut props = Properties::new();
        assert_eq!(props.insert("name", Value::from("marko")), None);
        assert_eq!(
            props.insert("name", Value::from("peter")),
            Some(Value::from("marko"))
        );
        assert_eq!(props.get("name"), Some(&Value::from("peter")));
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn remove_returns_previous_value() {
        let mut props = Properties::new();
        props.insert("age", Value::from(29i64));

        assert_eq!(props.remove("age"), Some(Value::from(29i64)));
        assert_eq!(props.remove("age"), None);
        assert!(props.is_empty());
    }

    #[test]
    fn keys_are_ordered() {
        let mut props = Properties::new();
        props.insert("b", Value::from(1i64));
        props.insert("a", Value::from(2i64));

        let keys: Vec<_> = props.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
