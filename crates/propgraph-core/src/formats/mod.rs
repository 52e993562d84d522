//! # Formats
//!
//! On-disk representation of the graph.

mod persistence;

pub use persistence::*;
