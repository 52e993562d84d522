//! # Elements
//!
//! Vertex and edge records, owned by the graph's element tables.
//!
//! Records never hold references to each other. An edge stores the ids of its
//! endpoints and a vertex stores the ids of its incident edges, grouped by
//! label and direction. Ids are resolved back through the graph on access.

use crate::ids::normalize_id;
use crate::property::Properties;
use crate::{EdgeId, ElementId, ElementKind, Value, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Adjacency of one direction: label -> incident edge ids.
pub type Adjacency = BTreeMap<String, BTreeSet<EdgeId>>;

// =============================================================================
// ELEMENT CAPABILITY
// =============================================================================

/// Read capability shared by vertices and edges.
///
/// Property mutation is not part of this trait: it goes through the graph,
/// which keeps the automatic indices in step.
pub trait Element {
    /// Tagged id of this element.
    fn element_id(&self) -> ElementId;

    /// Raw id string.
    fn id_str(&self) -> &str;

    fn kind(&self) -> ElementKind;

    fn properties(&self) -> &Properties;

    fn property(&self, key: &str) -> Option<&Value> {
        self.properties().get(key)
    }

    fn property_keys(&self) -> Vec<String> {
        self.properties().keys().map(str::to_string).collect()
    }

    /// True if `candidate`, once normalized, is this element's id.
    fn has_id(&self, candidate: &dyn fmt::Display) -> bool {
        self.id_str() == normalize_id(candidate)
    }
}

fn select(adjacency: &Adjacency, labels: &[&str]) -> Vec<EdgeId> {
    if labels.is_empty() {
        return adjacency.values().flatten().cloned().collect();
    }
    let mut selected = BTreeSet::new();
    for label in labels {
        if let Some(edges) = adjacency.get(*label) {
            selected.extend(edges.iter().cloned());
        }
    }
    selected.into_iter().collect()
}

fn attach(adjacency: &mut Adjacency, label: &str, edge: EdgeId) {
    adjacency.entry(label.to_string()).or_default().insert(edge);
}

/// Remove `edge` from `label`'s set. Absence is a no-op.
fn detach(adjacency: &mut Adjacency, label: &str, edge: &EdgeId) -> bool {
    let Some(edges) = adjacency.get_mut(label) else {
        return false;
    };
    let removed = edges.remove(edge);
    if edges.is_empty() {
        adjacency.remove(label);
    }
    removed
}

// =============================================================================
// VERTEX
// =============================================================================

/// A graph node with labeled incident edges, split by direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    id: VertexId,
    properties: Properties,
    out_edges: Adjacency,
    in_edges: Adjacency,
}

impl Vertex {
    pub(crate) fn new(id: VertexId) -> Self {
        Self {
            id,
            properties: Properties::new(),
            out_edges: Adjacency::new(),
            in_edges: Adjacency::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &VertexId {
        &self.id
    }

    /// Outgoing edges under any of `labels`; all outgoing edges if `labels` is empty.
    #[must_use]
    pub fn out_edges(&self, labels: &[&str]) -> Vec<EdgeId> {
        select(&self.out_edges, labels)
    }

    /// Incoming edges under any of `labels`; all incoming edges if `labels` is empty.
    #[must_use]
    pub fn in_edges(&self, labels: &[&str]) -> Vec<EdgeId> {
        select(&self.in_edges, labels)
    }

    /// Labels with at least one outgoing edge.
    pub fn out_labels(&self) -> impl Iterator<Item = &str> {
        self.out_edges.keys().map(String::as_str)
    }

    /// Labels with at least one incoming edge.
    pub fn in_labels(&self) -> impl Iterator<Item = &str> {
        self.in_edges.keys().map(String::as_str)
    }

    /// Every incident edge in either direction. A self-loop appears once.
    #[must_use]
    pub fn incident_edges(&self) -> BTreeSet<EdgeId> {
        self.in_edges
            .values()
            .chain(self.out_edges.values())
            .flatten()
            .cloned()
            .collect()
    }

    /// Number of incident adjacency entries (a self-loop counts twice).
    #[must_use]
    pub fn degree(&self) -> usize {
        self.out_edges
            .values()
            .chain(self.in_edges.values())
            .map(BTreeSet::len)
            .sum()
    }

    pub(crate) fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub(crate) fn attach_out(&mut self, label: &str, edge: EdgeId) {
        attach(&mut self.out_edges, label, edge);
    }

    pub(crate) fn attach_in(&mut self, label: &str, edge: EdgeId) {
        attach(&mut self.in_edges, label, edge);
    }

    pub(crate) fn detach_out(&mut self, label: &str, edge: &EdgeId) -> bool {
        detach(&mut self.out_edges, label, edge)
    }

    pub(crate) fn detach_in(&mut self, label: &str, edge: &EdgeId) -> bool {
        detach(&mut self.in_edges, label, edge)
    }

    /// True if any adjacency set references `edge`.
    #[must_use]
    pub fn references(&self, edge: &EdgeId) -> bool {
        self.out_edges
            .values()
            .chain(self.in_edges.values())
            .any(|edges| edges.contains(edge))
    }
}

impl Element for Vertex {
    fn element_id(&self) -> ElementId {
        ElementId::Vertex(self.id.clone())
    }

    fn id_str(&self) -> &str {
        self.id.as_str()
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Vertex
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v[{}]", self.id)
    }
}

// =============================================================================
// EDGE
// =============================================================================

/// A directed, labeled connection between two vertices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    id: EdgeId,
    label: String,
    properties: Properties,
    out_vertex: VertexId,
    in_vertex: VertexId,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, out_vertex: VertexId, in_vertex: VertexId, label: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
            properties: Properties::new(),
            out_vertex,
            in_vertex,
        }
    }

    #[must_use]
    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The tail vertex.
    #[must_use]
    pub fn out_vertex(&self) -> &VertexId {
        &self.out_vertex
    }

    /// The head vertex.
    #[must_use]
    pub fn in_vertex(&self) -> &VertexId {
        &self.in_vertex
    }

    /// The endpoint opposite `vertex`, or `None` if `vertex` is not an endpoint.
    #[must_use]
    pub fn other_end(&self, vertex: &VertexId) -> Option<&VertexId> {
        if *vertex == self.out_vertex {
            Some(&self.in_vertex)
        } else if *vertex == self.in_vertex {
            Some(&self.out_vertex)
        } else {
            None
        }
    }

    pub(crate) fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

impl Element for Edge {
    fn element_id(&self) -> ElementId {
        ElementId::Edge(self.id.clone())
    }

    fn id_str(&self) -> &str {
        self.id.as_str()
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Edge
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "e[{}][{}-{}->{}]",
            self.id, self.out_vertex, self.label, self.in_vertex
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(id: &str) -> EdgeId {
        EdgeId::new(id)
    }

    #[test]
    fn adjacency_selects_by_label() {
        let mut v = Vertex::new(VertexId::new("1"));
        v.attach_out("knows", edge("7"));
        v.attach_out("knows", edge("8"));
        v.attach_out("created", edge("9"));

        assert_eq!(v.out_edges(&["knows"]), vec![edge("7"), edge("8")]);
        assert_eq!(v.out_edges(&["created"]), vec![edge("9")]);
        assert_eq!(v.out_edges(&[]).len(), 3);
        assert!(v.out_edges(&["missing"]).is_empty());
        assert!(v.in_edges(&[]).is_empty());
    }

    #[test]
    fn detach_is_idempotent_and_prunes_labels() {
        let mut v = Vertex::new(VertexId::new("1"));
        v.attach_in("knows", edge("7"));

        assert!(v.detach_in("knows", &edge("7")));
        assert!(!v.detach_in("knows", &edge("7")));
        assert!(!v.detach_in("never", &edge("7")));
        assert_eq!(v.in_labels().count(), 0);
        assert!(!v.references(&edge("7")));
    }

    #[test]
    fn self_loop_counted_once_in_incident_edges() {
        let mut v = Vertex::new(VertexId::new("1"));
        v.attach_out("self", edge("5"));
        v.attach_in("self", edge("5"));

        assert_eq!(v.incident_edges().len(), 1);
        assert_eq!(v.degree(), 2);
    }

    #[test]
    fn equality_is_by_id() {
        let mut a = Vertex::new(VertexId::new("1"));
        let b = Vertex::new(VertexId::new("1"));
        a.properties_mut().insert("name", Value::from("marko"));

        assert_eq!(a, b);
        assert_ne!(a, Vertex::new(VertexId::new("2")));
    }

    #[test]
    fn has_id_normalizes_candidate() {
        let v = Vertex::new(VertexId::new("7"));
        assert!(v.has_id(&7));
        assert!(v.has_id(&"7"));
        assert!(!v.has_id(&8));
    }

    #[test]
    fn edge_accessors() {
        let e = Edge::new(edge("9"), VertexId::new("1"), VertexId::new("2"), "knows");

        assert_eq!(e.label(), "knows");
        assert_eq!(e.other_end(&VertexId::new("1")), Some(&VertexId::new("2")));
        assert_eq!(e.other_end(&VertexId::new("2")), Some(&VertexId::new("1")));
        assert_eq!(e.other_end(&VertexId::new("3")), None);
        assert_eq!(e.to_string(), "e[9][1-knows->2]");
        assert_eq!(e.element_id(), ElementId::Edge(edge("9")));
    }
}
