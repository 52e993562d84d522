//! # propgraph-core
//!
//! An in-memory property graph storage engine.
//!
//! Vertices and edges carry mutable key/value properties, edges are directed
//! and labeled, and lookup indices map `(key, value)` pairs to elements.
//!
//! ## Components
//!
//! - `ids` → collision-checked id allocation
//! - `property` → per-element property bag and reserved keys
//! - `index` → manual and automatic lookup indices
//! - `graph` → the store: element tables, adjacency, cascading removal
//! - `formats` → whole-graph snapshot encoding and file I/O
//!
//! ## Architectural Constraints
//!
//! - Single-threaded: no internal locking, one logical caller mutates at a time
//! - The graph owns every element; records refer to each other by id only
//! - Blocking I/O happens only at open (snapshot read) and shutdown (snapshot write)
//!
//! ## Example
//!
//! ```
//! use propgraph_core::{ElementKind, Graph, GraphStore, Value};
//!
//! let mut graph = Graph::new();
//! let marko = graph.add_vertex(Some("1")).unwrap();
//! let vadas = graph.add_vertex(Some("2")).unwrap();
//! graph.add_edge(None, &marko, &vadas, "knows").unwrap();
//! graph.set_property(&marko.clone().into(), "name", Value::from("marko")).unwrap();
//!
//! let index = graph.get_index("vertices", ElementKind::Vertex).unwrap().unwrap();
//! assert_eq!(index.count("name", &Value::from("marko")), 1);
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod element;
pub mod formats;
pub mod graph;
pub mod ids;
pub mod index;
pub mod primitives;
pub mod property;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{EdgeId, ElementId, ElementKind, GraphError, Value, VertexId};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use config::GraphConfig;
pub use element::{Edge, Element, Vertex};
pub use graph::{Graph, GraphStore, Snapshot};
pub use ids::{IdAllocator, normalize_id};
pub use index::{AutoKeys, Index};
pub use property::Properties;

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{read_snapshot, snapshot_from_bytes, snapshot_to_bytes, write_snapshot};
