//! # CLI Command Implementations
//!
//! Every command opens the graph from its snapshot directory. Mutating
//! commands apply one change and call `shutdown()` so the snapshot is
//! rewritten; read-only commands never write.

use crate::AppError;
use crate::values::{parse_value, value_to_json};
use propgraph_core::{
    AutoKeys, EdgeId, Element, ElementId, ElementKind, Graph, GraphConfig, GraphError, GraphStore,
    Index, VertexId,
};
use serde_json::json;
use std::path::Path;
use tracing::info;

// =============================================================================
// HELPERS
// =============================================================================

fn snapshot_path(config: &GraphConfig) -> Result<std::path::PathBuf, AppError> {
    config
        .snapshot_path()
        .ok_or_else(|| AppError::Config("no graph directory configured".to_string()))
}

/// Open an initialized graph. A directory without a snapshot is an error
/// so a mistyped `--dir` never silently creates an empty graph.
pub fn open_graph(config: &GraphConfig) -> Result<Graph, AppError> {
    let path = snapshot_path(config)?;
    if !path.is_file() {
        return Err(AppError::NotInitialized(path.display().to_string()));
    }
    Ok(Graph::with_config(config.clone())?)
}

/// Open, mutate, persist.
fn with_graph<T>(
    config: &GraphConfig,
    change: impl FnOnce(&mut Graph) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut graph = open_graph(config)?;
    let out = change(&mut graph)?;
    graph.shutdown()?;
    Ok(out)
}

fn element_id(kind: ElementKind, id: &str) -> ElementId {
    match kind {
        ElementKind::Vertex => ElementId::Vertex(VertexId::new(id)),
        ElementKind::Edge => ElementId::Edge(EdgeId::new(id)),
    }
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

fn index_json(index: &Index) -> serde_json::Value {
    json!({
        "name": index.name(),
        "kind": index.kind().name(),
        "automatic": index.is_automatic(),
        "keys": index
            .auto_keys()
            .and_then(AutoKeys::keys)
            .map(|keys| keys.iter().collect::<Vec<_>>()),
        "entries": index.len(),
    })
}

fn properties_json<E: Element>(element: &E) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = element
        .properties()
        .iter()
        .map(|(key, value)| (key.to_string(), value_to_json(value)))
        .collect();
    serde_json::Value::Object(map)
}

// =============================================================================
// JSON VIEWS
// =============================================================================

/// Counts and index registry of a graph.
pub fn status_json(graph: &Graph) -> serde_json::Value {
    json!({
        "directory": graph.directory().map(|d| d.display().to_string()),
        "vertex_count": graph.vertex_count(),
        "edge_count": graph.edge_count(),
        "next_id": graph.next_id(),
        "indices": graph.indices().into_iter().map(index_json).collect::<Vec<_>>(),
    })
}

/// Full contents of a graph: elements with properties, and every index
/// association.
pub fn dump_json(graph: &Graph) -> Result<serde_json::Value, AppError> {
    let mut vertices = Vec::with_capacity(graph.vertex_count());
    for id in graph.vertices() {
        let Some(vertex) = graph.get_vertex(id.as_str())? else {
            continue;
        };
        vertices.push(json!({
            "id": vertex.id().as_str(),
            "properties": properties_json(vertex),
        }));
    }

    let mut edges = Vec::with_capacity(graph.edge_count());
    for id in graph.edges() {
        let Some(edge) = graph.get_edge(id.as_str())? else {
            continue;
        };
        edges.push(json!({
            "id": edge.id().as_str(),
            "out": edge.out_vertex().as_str(),
            "in": edge.in_vertex().as_str(),
            "label": edge.label(),
            "properties": properties_json(edge),
        }));
    }

    let indices: Vec<_> = graph
        .indices()
        .into_iter()
        .map(|index| {
            let mut out = index_json(index);
            out["associations"] = index
                .iter()
                .map(|(key, value, element)| {
                    json!({
                        "key": key,
                        "value": value_to_json(value),
                        "id": element.as_str(),
                    })
                })
                .collect();
            out
        })
        .collect();

    Ok(json!({
        "next_id": graph.next_id(),
        "vertices": vertices,
        "edges": edges,
        "indices": indices,
    }))
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty graph with the default indices.
pub fn cmd_init(config: &GraphConfig, json_mode: bool, force: bool) -> Result<(), AppError> {
    let path = snapshot_path(config)?;
    if path.exists() && !force {
        return Err(AppError::AlreadyInitialized(path.display().to_string()));
    }

    // The old snapshot stays in place until the rename inside shutdown.
    let mut graph = Graph::create(config.clone())?;
    graph.shutdown()?;

    if json_mode {
        print_json(&json!({ "initialized": path.display().to_string() }));
    } else {
        println!("Initialized new graph at {}", path.display());
    }
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show graph status.
pub fn cmd_status(config: &GraphConfig, json_mode: bool) -> Result<(), AppError> {
    let graph = open_graph(config)?;

    if json_mode {
        print_json(&status_json(&graph));
        return Ok(());
    }

    println!("propgraph Status");
    println!("================");
    if let Some(dir) = graph.directory() {
        println!("Directory: {}", dir.display());
    }
    println!();
    println!("Vertices: {}", graph.vertex_count());
    println!("Edges:    {}", graph.edge_count());
    println!("Next id:  {}", graph.next_id());
    println!();
    println!("Indices:");
    for index in graph.indices() {
        let mode = match index.auto_keys().and_then(AutoKeys::keys) {
            _ if !index.is_automatic() => "manual".to_string(),
            None => "automatic, all keys".to_string(),
            Some(keys) => format!(
                "automatic, keys: {}",
                keys.iter().cloned().collect::<Vec<_>>().join(",")
            ),
        };
        println!(
            "  {:<16} {:<6} {:>6} entries ({})",
            index.name(),
            index.kind(),
            index.len(),
            mode
        );
    }

    Ok(())
}

// =============================================================================
// ELEMENT COMMANDS
// =============================================================================

pub fn cmd_add_vertex(
    config: &GraphConfig,
    json_mode: bool,
    id: Option<&str>,
) -> Result<(), AppError> {
    let vertex = with_graph(config, |graph| Ok(graph.add_vertex(id)?))?;

    if json_mode {
        print_json(&json!({ "vertex": vertex.as_str() }));
    } else {
        println!("Added vertex {}", vertex);
    }
    Ok(())
}

pub fn cmd_add_edge(
    config: &GraphConfig,
    json_mode: bool,
    id: Option<&str>,
    from: &str,
    to: &str,
    label: &str,
) -> Result<(), AppError> {
    let out = VertexId::new(from);
    let inv = VertexId::new(to);
    let edge = with_graph(config, |graph| Ok(graph.add_edge(id, &out, &inv, label)?))?;

    if json_mode {
        print_json(&json!({
            "edge": edge.as_str(),
            "out": from,
            "in": to,
            "label": label,
        }));
    } else {
        println!("Added edge {} ({} -{}-> {})", edge, from, label, to);
    }
    Ok(())
}

/// Remove a vertex together with its incident edges.
pub fn cmd_remove_vertex(config: &GraphConfig, json_mode: bool, id: &str) -> Result<(), AppError> {
    let vertex = VertexId::new(id);
    let removed_edges = with_graph(config, |graph| {
        let incident = graph
            .get_vertex(id)?
            .map(|v| v.incident_edges().len())
            .ok_or_else(|| GraphError::NotFound(ElementId::from(&vertex)))?;
        graph.remove_vertex(&vertex)?;
        Ok(incident)
    })?;

    if json_mode {
        print_json(&json!({ "removed": id, "removed_edges": removed_edges }));
    } else {
        println!("Removed vertex {} and {} incident edge(s)", id, removed_edges);
    }
    Ok(())
}

pub fn cmd_remove_edge(config: &GraphConfig, json_mode: bool, id: &str) -> Result<(), AppError> {
    with_graph(config, |graph| Ok(graph.remove_edge(&EdgeId::new(id))?))?;

    if json_mode {
        print_json(&json!({ "removed": id }));
    } else {
        println!("Removed edge {}", id);
    }
    Ok(())
}

// =============================================================================
// PROPERTY COMMANDS
// =============================================================================

pub fn cmd_set(
    config: &GraphConfig,
    json_mode: bool,
    kind: ElementKind,
    id: &str,
    key: &str,
    raw: &str,
) -> Result<(), AppError> {
    let value = parse_value(raw)?;
    let element = element_id(kind, id);
    let previous = with_graph(config, |graph| {
        Ok(graph.set_property(&element, key, value.clone())?)
    })?;

    if json_mode {
        print_json(&json!({
            "element": element.to_string(),
            "key": key,
            "value": value_to_json(&value),
            "previous": previous.as_ref().map(value_to_json),
        }));
    } else {
        match previous {
            Some(old) => println!("{}.{} = {} (was {})", element, key, value, old),
            None => println!("{}.{} = {}", element, key, value),
        }
    }
    Ok(())
}

pub fn cmd_unset(
    config: &GraphConfig,
    json_mode: bool,
    kind: ElementKind,
    id: &str,
    key: &str,
) -> Result<(), AppError> {
    let element = element_id(kind, id);
    let previous = with_graph(config, |graph| Ok(graph.remove_property(&element, key)?))?;

    if json_mode {
        print_json(&json!({
            "element": element.to_string(),
            "key": key,
            "previous": previous.as_ref().map(value_to_json),
        }));
    } else if let Some(old) = previous {
        println!("Removed {}.{} (was {})", element, key, old);
    } else {
        println!("{} has no property {}", element, key);
    }
    Ok(())
}

// =============================================================================
// INDEX COMMANDS
// =============================================================================

pub fn cmd_create_index(
    config: &GraphConfig,
    json_mode: bool,
    name: &str,
    kind: ElementKind,
    keys: &[String],
    manual: bool,
) -> Result<(), AppError> {
    if manual && !keys.is_empty() {
        return Err(GraphError::InvalidArgument(
            "--keys only applies to automatic indices".to_string(),
        )
        .into());
    }

    let created = with_graph(config, |graph| {
        let index = if manual {
            graph.create_manual_index(name, kind)?
        } else {
            graph.create_automatic_index(name, kind, AutoKeys::only(keys.iter().cloned()))?
        };
        Ok(index_json(index))
    })?;

    if json_mode {
        print_json(&created);
    } else {
        println!(
            "Created {} {} index {}",
            if manual { "manual" } else { "automatic" },
            kind,
            name
        );
    }
    Ok(())
}

pub fn cmd_drop_index(config: &GraphConfig, json_mode: bool, name: &str) -> Result<(), AppError> {
    let existed = with_graph(config, |graph| {
        let existed = graph.indices().iter().any(|index| index.name() == name);
        graph.drop_index(name);
        Ok(existed)
    })?;

    if json_mode {
        print_json(&json!({ "dropped": name, "existed": existed }));
    } else if existed {
        println!("Dropped index {}", name);
    } else {
        println!("No index named {}", name);
    }
    Ok(())
}

pub fn cmd_index_put(
    config: &GraphConfig,
    json_mode: bool,
    name: &str,
    kind: ElementKind,
    id: &str,
    key: &str,
    raw: &str,
) -> Result<(), AppError> {
    let value = parse_value(raw)?;
    let element = element_id(kind, id);
    with_graph(config, |graph| {
        Ok(graph.index_put(name, key, value.clone(), &element)?)
    })?;

    if json_mode {
        print_json(&json!({
            "index": name,
            "key": key,
            "value": value_to_json(&value),
            "element": element.to_string(),
        }));
    } else {
        println!("{}: ({}, {}) -> {}", name, key, value, element);
    }
    Ok(())
}

pub fn cmd_index_remove(
    config: &GraphConfig,
    json_mode: bool,
    name: &str,
    kind: ElementKind,
    id: &str,
    key: &str,
    raw: &str,
) -> Result<(), AppError> {
    let value = parse_value(raw)?;
    let element = element_id(kind, id);
    let removed = with_graph(config, |graph| {
        Ok(graph.index_remove(name, key, &value, &element)?)
    })?;

    if json_mode {
        print_json(&json!({ "index": name, "removed": removed }));
    } else if removed {
        println!("{}: removed ({}, {}) -> {}", name, key, value, element);
    } else {
        println!("{}: no association ({}, {}) -> {}", name, key, value, element);
    }
    Ok(())
}

/// Look up `(key, value)` in an index. A missing index is an error; a miss
/// is an empty result.
pub fn cmd_lookup(
    config: &GraphConfig,
    json_mode: bool,
    name: &str,
    kind: ElementKind,
    key: &str,
    raw: &str,
) -> Result<(), AppError> {
    let value = parse_value(raw)?;
    let graph = open_graph(config)?;
    let index = graph
        .get_index(name, kind)?
        .ok_or_else(|| GraphError::IndexNotFound(name.to_string()))?;
    let hits = index.get(key, &value);

    if json_mode {
        print_json(&json!({
            "index": name,
            "key": key,
            "value": value_to_json(&value),
            "ids": hits.iter().map(ElementId::as_str).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    if hits.is_empty() {
        println!("No {}s with {} = {}", kind, key, value);
    }
    for hit in hits {
        println!("{}", hit);
    }
    Ok(())
}

// =============================================================================
// DUMP COMMAND
// =============================================================================

/// Write the graph as JSON to `output`, or stdout.
pub fn cmd_dump(config: &GraphConfig, output: Option<&Path>) -> Result<(), AppError> {
    let graph = open_graph(config)?;
    let dump = dump_json(&graph)?;

    match output {
        None => print_json(&dump),
        Some(path) => {
            let text = serde_json::to_string_pretty(&dump)
                .map_err(|e| AppError::Io(format!("Cannot encode dump: {}", e)))?;
            std::fs::write(path, text).map_err(|e| {
                AppError::Io(format!("Cannot write '{}': {}", path.display(), e))
            })?;
            info!(path = %path.display(), "graph dumped");
        }
    }
    Ok(())
}
