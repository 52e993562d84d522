//! # Graph Store
//!
//! The in-memory property graph.
//!
//! The `Graph` is the sole owner of every element: one id-keyed table per
//! element kind, plus the index registry. Edges and adjacency sets hold plain
//! ids, never references, so removing an element is a matter of scrubbing ids
//! from the tables and indices that mention it.
//!
//! All tables use `BTreeMap` for deterministic ordering.
//!
//! ## Consistency
//!
//! Every mutation leaves the graph with:
//! - no adjacency entry naming a removed edge
//! - no index association naming a removed element
//! - at most one automatic-index association per (index, key, element),
//!   reflecting the current property value

use crate::config::GraphConfig;
use crate::element::{Edge, Element, Vertex};
use crate::formats::{read_snapshot, write_snapshot};
use crate::ids::{IdAllocator, normalize_id};
use crate::index::{AutoKeys, Index};
use crate::primitives::{EDGES_INDEX, VERTICES_INDEX};
use crate::property::{Properties, check_key};
use crate::{EdgeId, ElementId, ElementKind, GraphError, Value, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

// =============================================================================
// GRAPHSTORE TRAIT
// =============================================================================

/// The GraphStore trait defines the graph capability surface.
///
/// Wrapper layers (change notification, partitioning, read-only views)
/// delegate to an implementation of this trait.
pub trait GraphStore {
    /// Add a vertex. With `Some(id)` the id must be unused among vertices;
    /// with `None` an id is allocated.
    fn add_vertex(&mut self, id: Option<&str>) -> Result<VertexId, GraphError>;

    /// Add a directed edge `out -label-> inv`. Both endpoints must be live.
    fn add_edge(
        &mut self,
        id: Option<&str>,
        out: &VertexId,
        inv: &VertexId,
        label: &str,
    ) -> Result<EdgeId, GraphError>;

    /// Look up a vertex. An empty id is `InvalidArgument`; a miss is `Ok(None)`.
    fn get_vertex(&self, id: &str) -> Result<Option<&Vertex>, GraphError>;

    /// Look up an edge. An empty id is `InvalidArgument`; a miss is `Ok(None)`.
    fn get_edge(&self, id: &str) -> Result<Option<&Edge>, GraphError>;

    /// Ids of all vertices, detached from the graph.
    fn vertices(&self) -> Vec<VertexId>;

    /// Ids of all edges, detached from the graph.
    fn edges(&self) -> Vec<EdgeId>;

    fn vertex_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    /// Remove a vertex, every edge incident to it, and every index
    /// association pointing at any of them.
    fn remove_vertex(&mut self, id: &VertexId) -> Result<(), GraphError>;

    /// Remove an edge, its adjacency entries, and its index associations.
    fn remove_edge(&mut self, id: &EdgeId) -> Result<(), GraphError>;

    /// Set a property, returning the value it replaced.
    fn set_property(
        &mut self,
        element: &ElementId,
        key: &str,
        value: Value,
    ) -> Result<Option<Value>, GraphError>;

    /// Remove a property, returning the value it held.
    fn remove_property(
        &mut self,
        element: &ElementId,
        key: &str,
    ) -> Result<Option<Value>, GraphError>;

    fn create_automatic_index(
        &mut self,
        name: &str,
        kind: ElementKind,
        keys: AutoKeys,
    ) -> Result<&Index, GraphError>;

    fn create_manual_index(&mut self, name: &str, kind: ElementKind)
    -> Result<&Index, GraphError>;

    /// Fetch an index. A miss is `Ok(None)`; a kind mismatch is `TypeMismatch`.
    fn get_index(&self, name: &str, kind: ElementKind) -> Result<Option<&Index>, GraphError>;

    /// Every registered index, in name order.
    fn indices(&self) -> Vec<&Index>;

    /// Drop an index. Absence is not an error.
    fn drop_index(&mut self, name: &str);

    /// Add `(key, value) -> element` to a manual index.
    fn index_put(
        &mut self,
        name: &str,
        key: &str,
        value: Value,
        element: &ElementId,
    ) -> Result<(), GraphError>;

    /// Remove `(key, value) -> element` from a manual index.
    fn index_remove(
        &mut self,
        name: &str,
        key: &str,
        value: &Value,
        element: &ElementId,
    ) -> Result<bool, GraphError>;

    /// Empty the graph and reinstall the default automatic indices.
    fn clear(&mut self);

    /// Persist the graph if a backing directory is configured.
    fn shutdown(&mut self) -> Result<(), GraphError>;
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// The main Graph structure.
#[derive(Debug)]
pub struct Graph {
    vertices: BTreeMap<VertexId, Vertex>,
    edges: BTreeMap<EdgeId, Edge>,
    indices: BTreeMap<String, Index>,
    /// Names of the automatic indices: the observers of property mutation.
    auto_indices: BTreeSet<String>,
    ids: IdAllocator,
    config: GraphConfig,
    /// Set after a failed snapshot write; persistent mode is unusable from then on.
    storage_failed: bool,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create an empty in-memory graph with the default automatic indices.
    #[must_use]
    pub fn new() -> Self {
        Self::empty(GraphConfig::in_memory())
    }

    /// Open a persistent graph rooted at `directory`.
    ///
    /// A directory without a snapshot yields an empty graph; otherwise the
    /// snapshot is restored wholesale.
    pub fn open(directory: impl AsRef<Path>) -> Result<Self, GraphError> {
        Self::with_config(GraphConfig::persistent(directory))
    }

    /// Create an empty graph as described by `config`, ignoring any snapshot
    /// already in its directory. The next `shutdown` replaces that snapshot.
    pub fn create(config: GraphConfig) -> Result<Self, GraphError> {
        if let Some(dir) = &config.directory {
            create_directory(dir)?;
        }
        info!(directory = ?config.directory, "created empty graph");
        Ok(Self::empty(config))
    }

    /// Create or restore a graph as described by `config`.
    pub fn with_config(config: GraphConfig) -> Result<Self, GraphError> {
        let (Some(dir), Some(path)) = (config.directory.clone(), config.snapshot_path()) else {
            return Ok(Self::empty(config));
        };

        create_directory(&dir)?;

        match read_snapshot(&path)? {
            Some(snapshot) => {
                let graph = Self::from_snapshot(snapshot, config)?;
                info!(
                    path = %path.display(),
                    vertices = graph.vertices.len(),
                    edges = graph.edges.len(),
                    "restored graph snapshot"
                );
                Ok(graph)
            }
            None => {
                info!(path = %path.display(), "no snapshot found, starting empty graph");
                Ok(Self::empty(config))
            }
        }
    }

    fn empty(config: GraphConfig) -> Self {
        let mut graph = Self {
            vertices: BTreeMap::new(),
            edges: BTreeMap::new(),
            indices: BTreeMap::new(),
            auto_indices: BTreeSet::new(),
            ids: IdAllocator::new(),
            config,
            storage_failed: false,
        };
        graph.install_default_indices();
        graph
    }

    fn install_default_indices(&mut self) {
        for (name, kind) in [
            (VERTICES_INDEX, ElementKind::Vertex),
            (EDGES_INDEX, ElementKind::Edge),
        ] {
            self.indices
                .insert(name.to_string(), Index::automatic(name, kind, AutoKeys::all()));
            self.auto_indices.insert(name.to_string());
        }
    }

    /// Backing directory, if persistent.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.config.directory.as_deref()
    }

    /// Counter value the next id allocation starts from.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.ids.peek()
    }

    /// Capture the whole graph state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            ids: self.ids,
            vertices: self.vertices.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
            indices: self.indices.values().cloned().collect(),
            auto_indices: self.auto_indices.iter().cloned().collect(),
        }
    }

    /// Rebuild a graph from a snapshot, replacing every table as a unit.
    ///
    /// Rejects snapshots whose edges name missing vertices or whose
    /// automatic subset names unknown indices.
    pub fn from_snapshot(snapshot: Snapshot, config: GraphConfig) -> Result<Self, GraphError> {
        let vertices: BTreeMap<VertexId, Vertex> = snapshot
            .vertices
            .into_iter()
            .map(|v| (v.id().clone(), v))
            .collect();

        let mut edges = BTreeMap::new();
        for edge in snapshot.edges {
            for end in [edge.out_vertex(), edge.in_vertex()] {
                if !vertices.contains_key(end) {
                    return Err(GraphError::Storage(format!(
                        "Snapshot edge {} references missing vertex {}",
                        edge.id(),
                        end
                    )));
                }
            }
            edges.insert(edge.id().clone(), edge);
        }
        check_adjacency(&vertices, &edges)?;

        let indices: BTreeMap<String, Index> = snapshot
            .indices
            .into_iter()
            .map(|i| (i.name().to_string(), i))
            .collect();

        let mut auto_indices = BTreeSet::new();
        for name in snapshot.auto_indices {
            if !indices.get(&name).is_some_and(Index::is_automatic) {
                return Err(GraphError::Storage(format!(
                    "Snapshot names unknown automatic index {}",
                    name
                )));
            }
            auto_indices.insert(name);
        }

        Ok(Self {
            vertices,
            edges,
            indices,
            auto_indices,
            ids: snapshot.ids,
            config,
            storage_failed: false,
        })
    }

    fn resolve_id(
        &mut self,
        id: Option<&str>,
        kind: ElementKind,
    ) -> Result<String, GraphError> {
        match id {
            Some(raw) => {
                let id = normalize_id(raw);
                if id.is_empty() {
                    return Err(GraphError::InvalidArgument(format!(
                        "{} identifier cannot be empty",
                        kind
                    )));
                }
                let taken = match kind {
                    ElementKind::Vertex => self.vertices.contains_key(id.as_str()),
                    ElementKind::Edge => self.edges.contains_key(id.as_str()),
                };
                if taken {
                    return Err(GraphError::AlreadyExists { kind, id });
                }
                Ok(id)
            }
            None => {
                let vertices = &self.vertices;
                let edges = &self.edges;
                self.ids
                    .allocate(|c| vertices.contains_key(c) || edges.contains_key(c))
            }
        }
    }

    fn properties_mut(&mut self, element: &ElementId) -> Result<&mut Properties, GraphError> {
        let props = match element {
            ElementId::Vertex(id) => self.vertices.get_mut(id).map(Vertex::properties_mut),
            ElementId::Edge(id) => self.edges.get_mut(id).map(Edge::properties_mut),
        };
        props.ok_or_else(|| GraphError::NotFound(element.clone()))
    }

    /// True if `element` is live in this graph.
    #[must_use]
    pub fn contains(&self, element: &ElementId) -> bool {
        match element {
            ElementId::Vertex(id) => self.vertices.contains_key(id),
            ElementId::Edge(id) => self.edges.contains_key(id),
        }
    }

    /// Property of a vertex or edge. `None` if the element or key is absent.
    #[must_use]
    pub fn property(&self, element: &ElementId, key: &str) -> Option<&Value> {
        match element {
            ElementId::Vertex(id) => self.vertices.get(id)?.property(key),
            ElementId::Edge(id) => self.edges.get(id)?.property(key),
        }
    }

    /// Drop an edge from the table, its endpoints' adjacency and every index.
    /// Absence at any step is a no-op.
    fn detach_edge(&mut self, id: &EdgeId) -> bool {
        let Some(edge) = self.edges.remove(id) else {
            return false;
        };
        if let Some(out) = self.vertices.get_mut(edge.out_vertex()) {
            out.detach_out(edge.label(), id);
        }
        if let Some(inv) = self.vertices.get_mut(edge.in_vertex()) {
            inv.detach_in(edge.label(), id);
        }
        purge(
            &mut self.indices,
            &self.auto_indices,
            &ElementId::Edge(id.clone()),
            edge.properties(),
        );
        debug!(edge = %id, label = edge.label(), "edge removed");
        true
    }
}

fn create_directory(dir: &Path) -> Result<(), GraphError> {
    fs::create_dir_all(dir).map_err(|e| {
        GraphError::Storage(format!(
            "Cannot create graph directory '{}': {}",
            dir.display(),
            e
        ))
    })
}

/// Every adjacency entry must name a live edge with the same label and this
/// vertex as the matching endpoint, and every edge must appear in both
/// endpoints' adjacency.
fn check_adjacency(
    vertices: &BTreeMap<VertexId, Vertex>,
    edges: &BTreeMap<EdgeId, Edge>,
) -> Result<(), GraphError> {
    let corrupt = |msg: String| GraphError::Storage(format!("Snapshot adjacency: {}", msg));

    for vertex in vertices.values() {
        let out_labels: Vec<&str> = vertex.out_labels().collect();
        let in_labels: Vec<&str> = vertex.in_labels().collect();
        for (outgoing, labels) in [(true, out_labels), (false, in_labels)] {
            for label in labels {
                let listed = if outgoing {
                    vertex.out_edges(&[label])
                } else {
                    vertex.in_edges(&[label])
                };
                for id in listed {
                    let Some(edge) = edges.get(&id) else {
                        return Err(corrupt(format!(
                            "vertex {} lists missing edge {}",
                            vertex.id(),
                            id
                        )));
                    };
                    let end = if outgoing {
                        edge.out_vertex()
                    } else {
                        edge.in_vertex()
                    };
                    if end != vertex.id() || edge.label() != label {
                        return Err(corrupt(format!(
                            "vertex {} lists edge {} under label {}",
                            vertex.id(),
                            edge,
                            label
                        )));
                    }
                }
            }
        }
    }

    for edge in edges.values() {
        let out_ok = vertices
            .get(edge.out_vertex())
            .is_some_and(|v| v.out_edges(&[edge.label()]).contains(edge.id()));
        let in_ok = vertices
            .get(edge.in_vertex())
            .is_some_and(|v| v.in_edges(&[edge.label()]).contains(edge.id()));
        if !out_ok || !in_ok {
            return Err(corrupt(format!("edge {} missing from its endpoints", edge)));
        }
    }
    Ok(())
}

/// Remove every association to `element`: automatic indices per currently
/// set property, manual indices of the same kind by full purge.
fn purge(
    indices: &mut BTreeMap<String, Index>,
    auto_indices: &BTreeSet<String>,
    element: &ElementId,
    properties: &Properties,
) {
    for (name, index) in indices.iter_mut() {
        if auto_indices.contains(name) {
            for (key, value) in properties.iter() {
                index.auto_remove(key, Some(value), element);
            }
        } else if index.kind() == element.kind() {
            index.remove_element(element);
        }
    }
}

impl GraphStore for Graph {
    fn add_vertex(&mut self, id: Option<&str>) -> Result<VertexId, GraphError> {
        let id = VertexId(self.resolve_id(id, ElementKind::Vertex)?);
        self.vertices.insert(id.clone(), Vertex::new(id.clone()));
        debug!(vertex = %id, "vertex added");
        Ok(id)
    }

    fn add_edge(
        &mut self,
        id: Option<&str>,
        out: &VertexId,
        inv: &VertexId,
        label: &str,
    ) -> Result<EdgeId, GraphError> {
        for end in [out, inv] {
            if !self.vertices.contains_key(end) {
                return Err(GraphError::NotFound(ElementId::Vertex(end.clone())));
            }
        }
        let id = EdgeId(self.resolve_id(id, ElementKind::Edge)?);

        self.edges
            .insert(id.clone(), Edge::new(id.clone(), out.clone(), inv.clone(), label));
        if let Some(v) = self.vertices.get_mut(out) {
            v.attach_out(label, id.clone());
        }
        if let Some(v) = self.vertices.get_mut(inv) {
            v.attach_in(label, id.clone());
        }
        debug!(edge = %id, out = %out, inv = %inv, label, "edge added");
        Ok(id)
    }

    fn get_vertex(&self, id: &str) -> Result<Option<&Vertex>, GraphError> {
        if id.is_empty() {
            return Err(GraphError::InvalidArgument(
                "vertex identifier cannot be empty".to_string(),
            ));
        }
        Ok(self.vertices.get(id))
    }

    fn get_edge(&self, id: &str) -> Result<Option<&Edge>, GraphError> {
        if id.is_empty() {
            return Err(GraphError::InvalidArgument(
                "edge identifier cannot be empty".to_string(),
            ));
        }
        Ok(self.edges.get(id))
    }

    fn vertices(&self) -> Vec<VertexId> {
        self.vertices.keys().cloned().collect()
    }

    fn edges(&self) -> Vec<EdgeId> {
        self.edges.keys().cloned().collect()
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn remove_vertex(&mut self, id: &VertexId) -> Result<(), GraphError> {
        let incident = self
            .vertices
            .get(id)
            .map(Vertex::incident_edges)
            .ok_or_else(|| GraphError::NotFound(ElementId::Vertex(id.clone())))?;

        for edge in &incident {
            self.detach_edge(edge);
        }

        if let Some(vertex) = self.vertices.remove(id) {
            purge(
                &mut self.indices,
                &self.auto_indices,
                &ElementId::Vertex(id.clone()),
                vertex.properties(),
            );
        }
        debug!(vertex = %id, cascaded = incident.len(), "vertex removed");
        Ok(())
    }

    fn remove_edge(&mut self, id: &EdgeId) -> Result<(), GraphError> {
        if self.detach_edge(id) {
            Ok(())
        } else {
            Err(GraphError::NotFound(ElementId::Edge(id.clone())))
        }
    }

    fn set_property(
        &mut self,
        element: &ElementId,
        key: &str,
        value: Value,
    ) -> Result<Option<Value>, GraphError> {
        check_key(element.kind(), key)?;
        let old = self.properties_mut(element)?.insert(key, value.clone());

        for name in &self.auto_indices {
            if let Some(index) = self.indices.get_mut(name) {
                index.auto_update(key, &value, old.as_ref(), element);
            }
        }
        debug!(element = %element, key, "property set");
        Ok(old)
    }

    fn remove_property(
        &mut self,
        element: &ElementId,
        key: &str,
    ) -> Result<Option<Value>, GraphError> {
        let old = self.properties_mut(element)?.remove(key);

        for name in &self.auto_indices {
            if let Some(index) = self.indices.get_mut(name) {
                index.auto_remove(key, old.as_ref(), element);
            }
        }
        debug!(element = %element, key, existed = old.is_some(), "property removed");
        Ok(old)
    }

    fn create_automatic_index(
        &mut self,
        name: &str,
        kind: ElementKind,
        keys: AutoKeys,
    ) -> Result<&Index, GraphError> {
        if self.indices.contains_key(name) {
            return Err(GraphError::IndexAlreadyExists(name.to_string()));
        }
        self.auto_indices.insert(name.to_string());
        debug!(index = name, %kind, "automatic index created");
        Ok(self
            .indices
            .entry(name.to_string())
            .or_insert_with(|| Index::automatic(name, kind, keys)))
    }

    fn create_manual_index(
        &mut self,
        name: &str,
        kind: ElementKind,
    ) -> Result<&Index, GraphError> {
        if self.indices.contains_key(name) {
            return Err(GraphError::IndexAlreadyExists(name.to_string()));
        }
        debug!(index = name, %kind, "manual index created");
        Ok(self
            .indices
            .entry(name.to_string())
            .or_insert_with(|| Index::manual(name, kind)))
    }

    fn get_index(&self, name: &str, kind: ElementKind) -> Result<Option<&Index>, GraphError> {
        match self.indices.get(name) {
            None => Ok(None),
            Some(index) if index.kind() != kind => Err(GraphError::TypeMismatch {
                index: name.to_string(),
                stored: index.kind(),
                requested: kind,
            }),
            Some(index) => Ok(Some(index)),
        }
    }

    fn indices(&self) -> Vec<&Index> {
        self.indices.values().collect()
    }

    fn drop_index(&mut self, name: &str) {
        let dropped = self.indices.remove(name).is_some();
        self.auto_indices.remove(name);
        if dropped {
            debug!(index = name, "index dropped");
        }
    }

    fn index_put(
        &mut self,
        name: &str,
        key: &str,
        value: Value,
        element: &ElementId,
    ) -> Result<(), GraphError> {
        let live = self.contains(element);
        let index = manual_index(&mut self.indices, name, element)?;
        if !live {
            return Err(GraphError::NotFound(element.clone()));
        }
        index.put(key, value, element.clone());
        Ok(())
    }

    fn index_remove(
        &mut self,
        name: &str,
        key: &str,
        value: &Value,
        element: &ElementId,
    ) -> Result<bool, GraphError> {
        let index = manual_index(&mut self.indices, name, element)?;
        Ok(index.remove(key, value, element))
    }

    fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.indices.clear();
        self.auto_indices.clear();
        self.ids.reset();
        self.install_default_indices();
        debug!("graph cleared");
    }

    fn shutdown(&mut self) -> Result<(), GraphError> {
        let Some(path) = self.config.snapshot_path() else {
            return Ok(());
        };
        if self.storage_failed {
            return Err(GraphError::Storage(format!(
                "Persistent mode disabled after an earlier failure writing '{}'",
                path.display()
            )));
        }
        match write_snapshot(&path, &self.snapshot()) {
            Ok(()) => {
                info!(
                    path = %path.display(),
                    vertices = self.vertices.len(),
                    edges = self.edges.len(),
                    "graph snapshot written"
                );
                Ok(())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "graph snapshot write failed");
                self.storage_failed = true;
                Err(e)
            }
        }
    }
}

/// Resolve a manual index that may hold `element`.
fn manual_index<'a>(
    indices: &'a mut BTreeMap<String, Index>,
    name: &str,
    element: &ElementId,
) -> Result<&'a mut Index, GraphError> {
    let index = indices
        .get_mut(name)
        .ok_or_else(|| GraphError::IndexNotFound(name.to_string()))?;
    if index.kind() != element.kind() {
        return Err(GraphError::TypeMismatch {
            index: name.to_string(),
            stored: index.kind(),
            requested: element.kind(),
        });
    }
    if index.is_automatic() {
        return Err(GraphError::InvalidArgument(format!(
            "index {} is automatic and only follows property mutation",
            name
        )));
    }
    Ok(index)
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "graph[vertices:{} edges:{}",
            self.vertices.len(),
            self.edges.len()
        )?;
        if let Some(dir) = self.directory() {
            write!(f, " directory:{}", dir.display())?;
        }
        f.write_str("]")
    }
}

// =============================================================================
// SERIALIZATION SUPPORT
// =============================================================================

/// Serializable image of the whole graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ids: IdAllocator,
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub indices: Vec<Index>,
    pub auto_indices: Vec<String>,
}

// =============================================================================
// TESTS
// =============================================================================
