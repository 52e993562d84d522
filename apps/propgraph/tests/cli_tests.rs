//! Integration tests for CLI commands against a real snapshot directory.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use propgraph::AppError;
use propgraph::cli::*;
use propgraph_core::{
    Element, ElementId, ElementKind, GraphConfig, GraphError, GraphStore, Value, VertexId,
};
use tempfile::TempDir;

fn setup() -> (TempDir, GraphConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = GraphConfig::persistent(dir.path());
    cmd_init(&config, true, false).unwrap();
    (dir, config)
}

// =============================================================================
// INIT
// =============================================================================

#[test]
fn test_commands_require_init() {
    let dir = tempfile::tempdir().unwrap();
    let config = GraphConfig::persistent(dir.path().join("absent"));

    let result = cmd_status(&config, true);

    assert!(matches!(result, Err(AppError::NotInitialized(_))));
    assert!(!dir.path().join("absent").exists());
}

#[test]
fn test_init_refuses_to_overwrite() {
    let (_dir, config) = setup();
    assert!(matches!(
        cmd_init(&config, true, false),
        Err(AppError::AlreadyInitialized(_))
    ));
}

#[test]
fn test_init_force_resets_graph() {
    let (_dir, config) = setup();
    cmd_add_vertex(&config, true, Some("1")).unwrap();

    cmd_init(&config, true, true).unwrap();

    let graph = open_graph(&config).unwrap();
    assert_eq!(graph.vertex_count(), 0);
    assert_eq!(graph.indices().len(), 2);
}

#[test]
fn test_init_force_keeps_old_snapshot_when_write_fails() {
    let (dir, config) = setup();
    cmd_add_vertex(&config, true, Some("1")).unwrap();
    // A directory squatting on the temporary path makes the snapshot write fail.
    std::fs::create_dir(dir.path().join("graph.tmp")).unwrap();

    let result = cmd_init(&config, true, true);

    assert!(matches!(result, Err(AppError::Graph(GraphError::Storage(_)))));
    std::fs::remove_dir(dir.path().join("graph.tmp")).unwrap();
    assert_eq!(open_graph(&config).unwrap().vertex_count(), 1);
}

#[test]
fn test_init_force_over_corrupt_snapshot() {
    let (dir, config) = setup();
    std::fs::write(dir.path().join("graph.dat"), b"garbage").unwrap();

    cmd_init(&config, true, true).unwrap();

    assert_eq!(open_graph(&config).unwrap().vertex_count(), 0);
}

// =============================================================================
// ELEMENTS AND PROPERTIES
// =============================================================================

#[test]
fn test_mutations_persist_between_commands() {
    let (_dir, config) = setup();
    cmd_add_vertex(&config, true, Some("1")).unwrap();
    cmd_add_vertex(&config, true, Some("2")).unwrap();
    cmd_add_edge(&config, true, Some("7"), "1", "2", "knows").unwrap();
    cmd_set(&config, true, ElementKind::Vertex, "1", "name", "marko").unwrap();
    cmd_set(&config, true, ElementKind::Vertex, "1", "age", "29").unwrap();
    cmd_set(&config, true, ElementKind::Edge, "7", "weight", "5").unwrap();

    let graph = open_graph(&config).unwrap();
    let marko = graph.get_vertex("1").unwrap().unwrap();
    assert_eq!(marko.property("name"), Some(&Value::from("marko")));
    assert_eq!(marko.property("age"), Some(&Value::Integer(29)));
    let edge = graph.get_edge("7").unwrap().unwrap();
    assert_eq!(edge.label(), "knows");
    assert_eq!(edge.property("weight"), Some(&Value::Integer(5)));
}

#[test]
fn test_unset_removes_property_and_index_entry() {
    let (_dir, config) = setup();
    cmd_add_vertex(&config, true, Some("1")).unwrap();
    cmd_set(&config, true, ElementKind::Vertex, "1", "name", "marko").unwrap();

    cmd_unset(&config, true, ElementKind::Vertex, "1", "name").unwrap();

    let graph = open_graph(&config).unwrap();
    let index = graph
        .get_index("vertices", ElementKind::Vertex)
        .unwrap()
        .unwrap();
    assert!(index.is_empty());
    assert!(graph.get_vertex("1").unwrap().unwrap().property("name").is_none());
}

#[test]
fn test_duplicate_vertex_is_rejected() {
    let (_dir, config) = setup();
    cmd_add_vertex(&config, true, Some("1")).unwrap();

    let result = cmd_add_vertex(&config, true, Some("1"));

    assert!(matches!(
        result,
        Err(AppError::Graph(GraphError::AlreadyExists { .. }))
    ));
    assert_eq!(open_graph(&config).unwrap().vertex_count(), 1);
}

#[test]
fn test_reserved_key_is_rejected() {
    let (_dir, config) = setup();
    cmd_add_vertex(&config, true, Some("1")).unwrap();

    let result = cmd_set(&config, true, ElementKind::Vertex, "1", "id", "2");

    assert!(matches!(
        result,
        Err(AppError::Graph(GraphError::ReservedKey { .. }))
    ));
}

#[test]
fn test_invalid_value_is_rejected_before_opening() {
    let (_dir, config) = setup();
    let result = cmd_set(&config, true, ElementKind::Vertex, "1", "w", "0.5");
    assert!(matches!(result, Err(AppError::InvalidValue { .. })));
}

#[test]
fn test_remove_vertex_cascades() {
    let (_dir, config) = setup();
    for id in ["a", "b", "c"] {
        cmd_add_vertex(&config, true, Some(id)).unwrap();
    }
    cmd_add_edge(&config, true, None, "a", "b", "knows").unwrap();
    cmd_add_edge(&config, true, None, "b", "c", "knows").unwrap();

    cmd_remove_vertex(&config, true, "b").unwrap();

    let graph = open_graph(&config).unwrap();
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(
        graph.vertices(),
        vec![VertexId::new("a"), VertexId::new("c")]
    );
}

#[test]
fn test_remove_missing_elements_fail() {
    let (_dir, config) = setup();
    assert!(matches!(
        cmd_remove_vertex(&config, true, "ghost"),
        Err(AppError::Graph(GraphError::NotFound(_)))
    ));
    assert!(matches!(
        cmd_remove_edge(&config, true, "ghost"),
        Err(AppError::Graph(GraphError::NotFound(_)))
    ));
}

// =============================================================================
// INDICES
// =============================================================================

#[test]
fn test_manual_index_lifecycle() {
    let (_dir, config) = setup();
    cmd_add_vertex(&config, true, Some("1")).unwrap();
    cmd_create_index(&config, true, "people", ElementKind::Vertex, &[], true).unwrap();

    cmd_index_put(&config, true, "people", ElementKind::Vertex, "1", "type", "person").unwrap();

    let graph = open_graph(&config).unwrap();
    let people = graph.get_index("people", ElementKind::Vertex).unwrap().unwrap();
    assert!(!people.is_automatic());
    assert_eq!(
        people.get("type", &Value::from("person")),
        vec![ElementId::Vertex(VertexId::new("1"))]
    );

    cmd_index_remove(&config, true, "people", ElementKind::Vertex, "1", "type", "person")
        .unwrap();
    let graph = open_graph(&config).unwrap();
    assert!(
        graph
            .get_index("people", ElementKind::Vertex)
            .unwrap()
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_manual_index_rejects_keys() {
    let (_dir, config) = setup();
    let result = cmd_create_index(
        &config,
        true,
        "people",
        ElementKind::Vertex,
        &["name".to_string()],
        true,
    );
    assert!(matches!(
        result,
        Err(AppError::Graph(GraphError::InvalidArgument(_)))
    ));
}

#[test]
fn test_keyed_automatic_index_survives_restart() {
    let (_dir, config) = setup();
    cmd_create_index(
        &config,
        true,
        "by-weight",
        ElementKind::Edge,
        &["weight".to_string()],
        false,
    )
    .unwrap();
    cmd_add_vertex(&config, true, Some("1")).unwrap();
    cmd_add_edge(&config, true, Some("9"), "1", "1", "self").unwrap();
    cmd_set(&config, true, ElementKind::Edge, "9", "weight", "3").unwrap();
    cmd_set(&config, true, ElementKind::Edge, "9", "note", "loop").unwrap();

    let graph = open_graph(&config).unwrap();
    let index = graph.get_index("by-weight", ElementKind::Edge).unwrap().unwrap();
    assert!(index.is_automatic());
    assert_eq!(index.count("weight", &Value::Integer(3)), 1);
    assert_eq!(index.keys().collect::<Vec<_>>(), vec!["weight"]);
}

#[test]
fn test_lookup_errors() {
    let (_dir, config) = setup();
    assert!(matches!(
        cmd_lookup(&config, true, "nope", ElementKind::Vertex, "k", "v"),
        Err(AppError::Graph(GraphError::IndexNotFound(_)))
    ));
    assert!(matches!(
        cmd_lookup(&config, true, "vertices", ElementKind::Edge, "k", "v"),
        Err(AppError::Graph(GraphError::TypeMismatch { .. }))
    ));
    assert!(cmd_lookup(&config, true, "vertices", ElementKind::Vertex, "k", "v").is_ok());
}

#[test]
fn test_drop_index() {
    let (_dir, config) = setup();
    cmd_create_index(&config, true, "people", ElementKind::Vertex, &[], true).unwrap();

    cmd_drop_index(&config, true, "people").unwrap();
    cmd_drop_index(&config, true, "people").unwrap();

    let graph = open_graph(&config).unwrap();
    assert!(graph.get_index("people", ElementKind::Vertex).unwrap().is_none());
}

// =============================================================================
// JSON VIEWS
// =============================================================================

#[test]
fn test_status_json() {
    let (_dir, config) = setup();
    cmd_add_vertex(&config, true, None).unwrap();

    let status = status_json(&open_graph(&config).unwrap());

    assert_eq!(status["vertex_count"], 1);
    assert_eq!(status["edge_count"], 0);
    assert_eq!(status["next_id"], 1);
    assert_eq!(status["indices"][0]["name"], "edges");
    assert_eq!(status["indices"][1]["name"], "vertices");
    assert_eq!(status["indices"][1]["automatic"], true);
}

#[test]
fn test_dump_json_and_file() {
    let (dir, config) = setup();
    cmd_add_vertex(&config, true, Some("1")).unwrap();
    cmd_add_vertex(&config, true, Some("2")).unwrap();
    cmd_add_edge(&config, true, Some("e"), "1", "2", "created").unwrap();
    cmd_set(&config, true, ElementKind::Vertex, "1", "langs", "[\"java\", 2]").unwrap();

    let dump = dump_json(&open_graph(&config).unwrap()).unwrap();
    assert_eq!(dump["vertices"][0]["id"], "1");
    assert_eq!(
        dump["vertices"][0]["properties"]["langs"],
        serde_json::json!(["java", 2])
    );
    assert_eq!(dump["edges"][0]["out"], "1");
    assert_eq!(dump["edges"][0]["in"], "2");
    assert_eq!(dump["edges"][0]["label"], "created");
    assert_eq!(dump["indices"][1]["associations"][0]["key"], "langs");

    let out = dir.path().join("dump.json");
    cmd_dump(&config, Some(&out)).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written, dump);
}

// =============================================================================
// DISPATCH
// =============================================================================

#[test]
fn test_execute_uses_dir_flag() {
    use clap::Parser;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_str().unwrap();
    let config = propgraph::AppConfig::default();

    let init = Cli::try_parse_from(["propgraph", "--dir", path, "init"]).unwrap();
    execute(init, &config).unwrap();
    let add = Cli::try_parse_from(["propgraph", "-D", path, "add-vertex", "--id", "x"]).unwrap();
    execute(add, &config).unwrap();

    let graph = open_graph(&GraphConfig::persistent(dir.path())).unwrap();
    assert!(graph.get_vertex("x").unwrap().is_some());
}

#[test]
fn test_execute_stores_negative_integer() {
    use clap::Parser;

    let (dir, config) = setup();
    let path = dir.path().to_str().unwrap();
    let app = propgraph::AppConfig::default();
    cmd_add_vertex(&config, true, Some("1")).unwrap();

    let set = Cli::try_parse_from(["propgraph", "-D", path, "set", "vertex", "1", "delta", "-7"])
        .unwrap();
    execute(set, &app).unwrap();

    let graph = open_graph(&config).unwrap();
    let vertex = graph.get_vertex("1").unwrap().unwrap();
    assert_eq!(vertex.property("delta"), Some(&Value::Integer(-7)));
}
