//! # propgraph
//!
//! Library half of the operator binary: command definitions, command
//! implementations, configuration and value parsing. `main.rs` only wires
//! logging and dispatches.

pub mod cli;
pub mod config;
mod error;
pub mod values;

pub use config::{AppConfig, LogConfig, LogFormat};
pub use error::AppError;
