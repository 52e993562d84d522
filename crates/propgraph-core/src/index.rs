//! # Index Subsystem
//!
//! Lookup indices mapping `(key, value)` to a set of elements of one kind.
//!
//! An index is either:
//! - **manual**: changed only by explicit `put` / `remove` calls
//! - **automatic**: kept in step with property mutation through the
//!   `auto_update` / `auto_remove` hooks, optionally restricted to a set of
//!   tracked keys
//!
//! Both kinds support `remove_element`, the full purge used when an element
//! is removed from the graph.

use crate::{ElementId, ElementKind, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

type Entries = BTreeMap<String, BTreeMap<Value, BTreeSet<ElementId>>>;

/// Tracked keys of an automatic index. `None` tracks every key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoKeys(Option<BTreeSet<String>>);

impl AutoKeys {
    /// Track every key.
    #[must_use]
    pub fn all() -> Self {
        Self(None)
    }

    /// Track only `keys`. An empty set tracks every key.
    pub fn only<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: BTreeSet<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            Self(None)
        } else {
            Self(Some(keys))
        }
    }

    #[must_use]
    pub fn tracks(&self, key: &str) -> bool {
        self.0.as_ref().is_none_or(|keys| keys.contains(key))
    }

    /// The explicit allow-set, if any.
    #[must_use]
    pub fn keys(&self) -> Option<&BTreeSet<String>> {
        self.0.as_ref()
    }
}

/// A named index over vertices or edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    name: String,
    kind: ElementKind,
    automatic: Option<AutoKeys>,
    entries: Entries,
}

impl Index {
    /// Create an empty manual index.
    #[must_use]
    pub fn manual(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
            automatic: None,
            entries: Entries::new(),
        }
    }

    /// Create an empty automatic index.
    #[must_use]
    pub fn automatic(name: impl Into<String>, kind: ElementKind, keys: AutoKeys) -> Self {
        Self {
            name: name.into(),
            kind,
            automatic: Some(keys),
            entries: Entries::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The element kind this index stores.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    #[must_use]
    pub fn is_automatic(&self) -> bool {
        self.automatic.is_some()
    }

    /// Tracked keys, for automatic indices.
    #[must_use]
    pub fn auto_keys(&self) -> Option<&AutoKeys> {
        self.automatic.as_ref()
    }

    /// Elements associated with `(key, value)`.
    ///
    /// Returns a copy; mutating it has no effect on the index.
    #[must_use]
    pub fn get(&self, key: &str, value: &Value) -> Vec<ElementId> {
        self.entries
            .get(key)
            .and_then(|values| values.get(value))
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of elements associated with `(key, value)`.
    #[must_use]
    pub fn count(&self, key: &str, value: &Value) -> usize {
        self.entries
            .get(key)
            .and_then(|values| values.get(value))
            .map_or(0, BTreeSet::len)
    }

    /// Keys with at least one association.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every `(key, value, element)` association, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value, &ElementId)> {
        self.entries.iter().flat_map(|(key, values)| {
            values.iter().flat_map(move |(value, set)| {
                set.iter().map(move |element| (key.as_str(), value, element))
            })
        })
    }

    /// Total number of associations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeSet::len)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if any association points at `element`.
    #[must_use]
    pub fn references(&self, element: &ElementId) -> bool {
        self.entries
            .values()
            .flat_map(BTreeMap::values)
            .any(|set| set.contains(element))
    }

    /// Associate `element` with `(key, value)`.
    pub fn put(&mut self, key: &str, value: Value, element: ElementId) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .entry(value)
            .or_default()
            .insert(element);
    }

    /// Drop the `(key, value) -> element` association. Absence is a no-op.
    pub fn remove(&mut self, key: &str, value: &Value, element: &ElementId) -> bool {
        let Some(values) = self.entries.get_mut(key) else {
            return false;
        };
        let Some(set) = values.get_mut(value) else {
            return false;
        };
        let removed = set.remove(element);
        if set.is_empty() {
            values.remove(value);
            if values.is_empty() {
                self.entries.remove(key);
            }
        }
        removed
    }

    /// Drop every association pointing at `element`, whatever its key and value.
    pub fn remove_element(&mut self, element: &ElementId) -> usize {
        let mut removed = 0;
        for values in self.entries.values_mut() {
            for set in values.values_mut() {
                if set.remove(element) {
                    removed += 1;
                }
            }
            values.retain(|_, set| !set.is_empty());
        }
        self.entries.retain(|_, values| !values.is_empty());
        removed
    }

    /// Property-set hook of an automatic index.
    ///
    /// Replaces the `(key, old)` association with `(key, new)` so the index
    /// holds at most one association per `(key, element)`.
    pub fn auto_update(
        &mut self,
        key: &str,
        new: &Value,
        old: Option<&Value>,
        element: &ElementId,
    ) {
        if !self.tracks(key, element) {
            return;
        }
        if let Some(old) = old {
            self.remove(key, old, element);
        }
        self.put(key, new.clone(), element.clone());
    }

    /// Property-remove hook of an automatic index.
    pub fn auto_remove(&mut self, key: &str, old: Option<&Value>, element: &ElementId) {
        if !self.tracks(key, element) {
            return;
        }
        if let Some(old) = old {
            self.remove(key, old, element);
        }
    }

    fn tracks(&self, key: &str, element: &ElementId) -> bool {
        element.kind() == self.kind && self.automatic.as_ref().is_some_and(|k| k.tracks(key))
    }
}

// =============================================================================
// TESTS
// =============================================================================
