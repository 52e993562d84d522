//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the property graph:
//! - Element identifiers (`VertexId`, `EdgeId`, `ElementId`)
//! - Element kinds (`ElementKind`)
//! - Property values (`Value`)
//! - Error types (`GraphError`)
//!
//! ## Identity
//!
//! Vertices and edges live in two separate id spaces. A vertex and an edge may
//! share the same id string without colliding. `ElementId` is the closed tagged
//! variant used wherever either kind may appear (index entries, property
//! mutation targets, error payloads).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

// =============================================================================
// ELEMENT IDENTIFIERS
// =============================================================================

/// Identifier of a vertex. Unique among vertices.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub String);

impl VertexId {
    /// Create a vertex id from anything string-like.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of an edge. Unique among edges.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Create an edge id from anything string-like.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for VertexId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EdgeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ELEMENT KIND
// =============================================================================

/// The two concrete element kinds of a property graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Vertex,
    Edge,
}

impl ElementKind {
    /// Lowercase name, as used in messages and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A reference to either a vertex or an edge.
///
/// Two element ids are equal iff they have the same kind and the same id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementId {
    Vertex(VertexId),
    Edge(EdgeId),
}

impl ElementId {
    /// The kind of element this id refers to.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Vertex(_) => ElementKind::Vertex,
            Self::Edge(_) => ElementKind::Edge,
        }
    }

    /// The raw id string, without the kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Vertex(id) => id.as_str(),
            Self::Edge(id) => id.as_str(),
        }
    }

    /// The vertex id, if this refers to a vertex.
    #[must_use]
    pub fn as_vertex(&self) -> Option<&VertexId> {
        match self {
            Self::Vertex(id) => Some(id),
            Self::Edge(_) => None,
        }
    }

    /// The edge id, if this refers to an edge.
    #[must_use]
    pub fn as_edge(&self) -> Option<&EdgeId> {
        match self {
            Self::Edge(id) => Some(id),
            Self::Vertex(_) => None,
        }
    }
}

impl From<VertexId> for ElementId {
    fn from(id: VertexId) -> Self {
        Self::Vertex(id)
    }
}

impl From<&VertexId> for ElementId {
    fn from(id: &VertexId) -> Self {
        Self::Vertex(id.clone())
    }
}

impl From<EdgeId> for ElementId {
    fn from(id: EdgeId) -> Self {
        Self::Edge(id)
    }
}

impl From<&EdgeId> for ElementId {
    fn from(id: &EdgeId) -> Self {
        Self::Edge(id.clone())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex(id) => write!(f, "v[{}]", id),
            Self::Edge(id) => write!(f, "e[{}]", id),
        }
    }
}

// =============================================================================
// PROPERTY VALUES
// =============================================================================

/// A property value.
///
/// Values are totally ordered so they can key the value level of an index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    /// Get the string payload if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer payload if this is an integer.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the boolean payload if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Type name for diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the graph engine.
///
/// - No silent failures: every variant names the offending id, key, or index
/// - Lookup misses are `Ok(None)`, never an error
/// - A failed mutating call leaves the element it targeted unchanged
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An element with this id already exists in its id space.
    #[error("{kind} with id {id} already exists")]
    AlreadyExists { kind: ElementKind, id: String },

    /// An index with this name is already registered.
    #[error("index already exists: {0}")]
    IndexAlreadyExists(String),

    /// A caller-supplied argument was absent or unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The key is reserved for this element kind and cannot be set as a property.
    #[error("property key {key} is reserved on {kind} elements")]
    ReservedKey { key: String, kind: ElementKind },

    /// An index was addressed with a kind that differs from the kind it stores.
    #[error("index {index} stores {stored} elements, not {requested}")]
    TypeMismatch {
        index: String,
        stored: ElementKind,
        requested: ElementKind,
    },

    /// The element is not live in this graph.
    #[error("element not found: {0}")]
    NotFound(ElementId),

    /// No index is registered under this name.
    #[error("index not found: {0}")]
    IndexNotFound(String),

    /// Snapshot read/write failure or exhausted id space.
    #[error("storage error: {0}")]
    Storage(String),
}

// =============================================================================
// TESTS
// =============================================================================
