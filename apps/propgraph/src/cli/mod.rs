//! # propgraph CLI Module
//!
//! Command-line interface over a graph snapshot directory.
//!
//! ## Available Commands
//!
//! - `init` - Create an empty graph
//! - `status` - Show counts and registered indices
//! - `add-vertex` / `add-edge` - Add elements
//! - `set` / `unset` - Change element properties
//! - `remove-vertex` / `remove-edge` - Remove elements (cascading)
//! - `create-index` / `drop-index` - Manage indices
//! - `index-put` / `index-remove` - Edit manual indices
//! - `lookup` - Query an index
//! - `dump` - Write the whole graph as JSON

mod commands;

use crate::{AppConfig, AppError};
use clap::{Parser, Subcommand, ValueEnum};
use propgraph_core::ElementKind;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// propgraph - property graph snapshot operator
#[derive(Parser, Debug)]
#[command(name = "propgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Graph snapshot directory (overrides `graph.directory`)
    #[arg(short = 'D', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Element kind as written on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Vertex,
    Edge,
}

impl From<KindArg> for ElementKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Vertex => ElementKind::Vertex,
            KindArg::Edge => ElementKind::Edge,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new empty graph
    Init {
        /// Overwrite an existing snapshot
        #[arg(short, long)]
        force: bool,
    },

    /// Show graph status
    Status,

    /// Add a vertex
    AddVertex {
        /// Explicit id (allocated when omitted)
        #[arg(long)]
        id: Option<String>,
    },

    /// Add a directed, labeled edge
    AddEdge {
        /// Out (tail) vertex id
        #[arg(long)]
        from: String,

        /// In (head) vertex id
        #[arg(long)]
        to: String,

        #[arg(short, long)]
        label: String,

        /// Explicit id (allocated when omitted)
        #[arg(long)]
        id: Option<String>,
    },

    /// Set a property on a vertex or edge
    Set {
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
        key: String,
        /// JSON literal (`42`, `-7`, `true`, `[1, "a"]`) or a bare string
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Remove a property from a vertex or edge
    Unset {
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
        key: String,
    },

    /// Remove a vertex and every edge incident to it
    RemoveVertex { id: String },

    /// Remove an edge
    RemoveEdge { id: String },

    /// Create an index
    CreateIndex {
        name: String,

        #[arg(short, long, value_enum, default_value = "vertex")]
        kind: KindArg,

        /// Keys an automatic index tracks (comma-separated; all when omitted)
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,

        /// Create a manual index, changed only by index-put / index-remove
        #[arg(short, long)]
        manual: bool,
    },

    /// Drop an index
    DropIndex { name: String },

    /// Add an association to a manual index
    IndexPut {
        name: String,
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Remove an association from a manual index
    IndexRemove {
        name: String,
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Look up elements by (key, value) in an index
    Lookup {
        name: String,
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,

        #[arg(short, long, value_enum, default_value = "vertex")]
        kind: KindArg,
    },

    /// Dump the whole graph as JSON
    Dump {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli, config: &AppConfig) -> Result<(), AppError> {
    let graph = config.graph_config(cli.dir.as_deref());
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&graph, json_mode, force),
        Some(Commands::Status) | None => cmd_status(&graph, json_mode),
        Some(Commands::AddVertex { id }) => cmd_add_vertex(&graph, json_mode, id.as_deref()),
        Some(Commands::AddEdge {
            from,
            to,
            label,
            id,
        }) => cmd_add_edge(&graph, json_mode, id.as_deref(), &from, &to, &label),
        Some(Commands::Set {
            kind,
            id,
            key,
            value,
        }) => cmd_set(&graph, json_mode, kind.into(), &id, &key, &value),
        Some(Commands::Unset { kind, id, key }) => {
            cmd_unset(&graph, json_mode, kind.into(), &id, &key)
        }
        Some(Commands::RemoveVertex { id }) => cmd_remove_vertex(&graph, json_mode, &id),
        Some(Commands::RemoveEdge { id }) => cmd_remove_edge(&graph, json_mode, &id),
        Some(Commands::CreateIndex {
            name,
            kind,
            keys,
            manual,
        }) => cmd_create_index(&graph, json_mode, &name, kind.into(), &keys, manual),
        Some(Commands::DropIndex { name }) => cmd_drop_index(&graph, json_mode, &name),
        Some(Commands::IndexPut {
            name,
            kind,
            id,
            key,
            value,
        }) => cmd_index_put(&graph, json_mode, &name, kind.into(), &id, &key, &value),
        Some(Commands::IndexRemove {
            name,
            kind,
            id,
            key,
            value,
        }) => cmd_index_remove(&graph, json_mode, &name, kind.into(), &id, &key, &value),
        Some(Commands::Lookup {
            name,
            key,
            value,
            kind,
        }) => cmd_lookup(&graph, json_mode, &name, kind.into(), &key, &value),
        Some(Commands::Dump { output }) => cmd_dump(&graph, output.as_deref()),
    }
}
