//! # Graph Configuration
//!
//! Where (and whether) a graph persists its snapshot.
//!
//! The binary deserializes this from the `[graph]` table of its TOML config.

use crate::primitives::SNAPSHOT_FILE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Storage configuration of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Backing directory. `None` keeps the graph purely in memory.
    pub directory: Option<PathBuf>,
    /// File name of the snapshot inside `directory`.
    pub snapshot_file: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            directory: None,
            snapshot_file: SNAPSHOT_FILE.to_string(),
        }
    }
}

impl GraphConfig {
    /// In-memory configuration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Persistent configuration rooted at `directory`.
    #[must_use]
    pub fn persistent(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: Some(directory.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Full path of the snapshot file, if persistent.
    #[must_use]
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.directory
            .as_ref()
            .map(|dir| dir.join(&self.snapshot_file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_has_no_snapshot_path() {
        assert_eq!(GraphConfig::in_memory().snapshot_path(), None);
    }

    #[test]
    fn persistent_joins_snapshot_file() {
        let config = GraphConfig::persistent("/tmp/g");
        assert_eq!(
            config.snapshot_path(),
            Some(PathBuf::from("/tmp/g").join(SNAPSHOT_FILE))
        );
    }
}
