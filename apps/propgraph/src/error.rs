//! Errors surfaced by the binary.

use propgraph_core::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Failure inside the storage engine.
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("config error: {0}")]
    Config(String),

    /// A command-line value that cannot become a property value.
    #[error("invalid value '{input}': {reason}")]
    InvalidValue { input: String, reason: String },

    #[error("no graph at {0}; run `propgraph init` first")]
    NotInitialized(String),

    #[error("graph already exists at {0}; use --force to overwrite")]
    AlreadyInitialized(String),

    #[error("io error: {0}")]
    Io(String),
}
