//! # Primitives
//!
//! Hardcoded constants of the graph engine.
//!
//! These are compiled into the binary and immutable at runtime.

/// Property key reserved for element identity on every element kind.
pub const ID_KEY: &str = "id";

/// Property key reserved for the edge label. Only reserved on edges.
pub const LABEL_KEY: &str = "label";

/// Name of the default automatic index over vertices.
pub const VERTICES_INDEX: &str = "vertices";

/// Name of the default automatic index over edges.
pub const EDGES_INDEX: &str = "edges";

/// File name of the snapshot inside a graph directory.
pub const SNAPSHOT_FILE: &str = "graph.dat";

/// Magic bytes for the snapshot header.
///
/// - File Header = Magic Bytes ("PGRF") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"PGRF";

/// Current snapshot format version.
///
/// Only a given engine build reading back its own snapshots is supported.
/// Increment this when the snapshot layout changes.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the snapshot header in bytes.
pub const HEADER_LEN: usize = 5;

/// Maximum accepted snapshot size (1 GiB).
///
/// Checked before any payload decoding.
pub const MAX_SNAPSHOT_SIZE: usize = 1024 * 1024 * 1024;
