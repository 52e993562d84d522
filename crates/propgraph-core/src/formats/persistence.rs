//! # Snapshot Format
//!
//! Binary serialization of a whole graph.
//!
//! Format: Header (5 bytes) + postcard-serialized `Snapshot`.
//! - 4 bytes: Magic ("PGRF")
//! - 1 byte: Version
//!
//! Only an engine build reading back its own snapshots is supported; there is
//! no cross-version compatibility.
//!
//! ## Validation
//!
//! Size and header are checked before the payload is decoded, so a truncated
//! or foreign file fails fast with `GraphError::Storage`.

use crate::graph::Snapshot;
use crate::{GraphError, primitives};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Leading bytes of every snapshot: the magic followed by the format version.
const HEADER: [u8; primitives::HEADER_LEN] = {
    let magic = primitives::MAGIC_BYTES;
    [magic[0], magic[1], magic[2], magic[3], primitives::FORMAT_VERSION]
};

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a snapshot to bytes (header + payload). No file I/O.
pub fn snapshot_to_bytes(snapshot: &Snapshot) -> Result<Vec<u8>, GraphError> {
    let payload = postcard::to_stdvec(snapshot)
        .map_err(|e| GraphError::Storage(format!("Failed to encode snapshot: {}", e)))?;

    let mut result = Vec::with_capacity(HEADER.len() + payload.len());
    result.extend_from_slice(&HEADER);
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize a snapshot from bytes. No file I/O.
pub fn snapshot_from_bytes(bytes: &[u8]) -> Result<Snapshot, GraphError> {
    if bytes.len() < primitives::HEADER_LEN {
        return Err(GraphError::Storage(format!(
            "Data too short: minimum {} bytes required",
            primitives::HEADER_LEN
        )));
    }
    if bytes.len() > primitives::MAX_SNAPSHOT_SIZE {
        return Err(GraphError::Storage(format!(
            "Snapshot size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            primitives::MAX_SNAPSHOT_SIZE
        )));
    }

    let (header, payload) = bytes.split_at(HEADER.len());
    if header[..4] != primitives::MAGIC_BYTES[..] {
        return Err(GraphError::Storage(
            "Not a propgraph snapshot (bad magic)".to_string(),
        ));
    }
    if header[4] != primitives::FORMAT_VERSION {
        return Err(GraphError::Storage(format!(
            "Unsupported snapshot version: {} (expected {})",
            header[4],
            primitives::FORMAT_VERSION
        )));
    }

    postcard::from_bytes(payload)
        .map_err(|e| GraphError::Storage(format!("Failed to decode snapshot: {}", e)))
}

// =============================================================================
// FILE I/O
// =============================================================================

/// Read the snapshot at `path`. A missing file is `Ok(None)`.
pub fn read_snapshot(path: &Path) -> Result<Option<Snapshot>, GraphError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(GraphError::Storage(format!(
                "Cannot read snapshot '{}': {}",
                path.display(),
                e
            )));
        }
    };
    snapshot_from_bytes(&bytes).map(Some)
}

/// Write `snapshot` to `path`, replacing any prior snapshot.
///
/// The bytes go to a sibling temporary file first and are renamed over
/// `path`, so a failed write never leaves a half-written snapshot behind.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), GraphError> {
    let bytes = snapshot_to_bytes(snapshot)?;
    let tmp = path.with_extension("tmp");

    fs::write(&tmp, &bytes).map_err(|e| {
        GraphError::Storage(format!("Cannot write snapshot '{}': {}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        GraphError::Storage(format!(
            "Cannot replace snapshot '{}': {}",
            path.display(),
            e
        ))
    })
}

// =============================================================================
// TESTS
// =============================================================================
