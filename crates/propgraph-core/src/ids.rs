//! # Id Allocator
//!
//! Produces collision-checked string identifiers for elements created
//! without an explicit id.
//!
//! The counter is graph-instance state: it is reset by `Graph::clear()` and
//! stored in the snapshot so a restored graph continues where it stopped.

use crate::GraphError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Normalize a caller-supplied identifier to its internal string form.
///
/// Every id entering the graph (explicit ids on add, `has_id` candidates)
/// passes through this rule, so `7` and `"7"` name the same element.
pub fn normalize_id(candidate: impl Display) -> String {
    candidate.to_string()
}

/// Monotonic id counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator starting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// The counter value the next allocation will try first.
    #[must_use]
    pub const fn peek(&self) -> u64 {
        self.next
    }

    /// Allocate the next id for which `is_live` returns false.
    ///
    /// `is_live` must report whether a candidate names a live vertex OR a
    /// live edge. Fails with `Storage` once the counter space is exhausted.
    pub fn allocate(&mut self, is_live: impl Fn(&str) -> bool) -> Result<String, GraphError> {
        loop {
            if self.next == u64::MAX {
                return Err(GraphError::Storage("id counter space exhausted".to_string()));
            }
            let candidate = self.next.to_string();
            self.next = self.next.saturating_add(1);
            if !is_live(&candidate) {
                return Ok(candidate);
            }
        }
    }

    /// Reset the counter to zero.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn normalize_stringifies() {
        assert_eq!(normalize_id(7), "7");
        assert_eq!(normalize_id("7"), "7");
        assert_eq!(normalize_id(String::from("marko")), "marko");
    }

    #[test]
    fn allocates_sequentially() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(|_| false).expect("allocate"), "0");
        assert_eq!(ids.allocate(|_| false).expect("allocate"), "1");
        assert_eq!(ids.peek(), 2);
    }

    #[test]
    fn skips_live_ids() {
        let live: BTreeSet<&str> = ["0", "1", "3"].into_iter().collect();
        let mut ids = IdAllocator::new();

        assert_eq!(ids.allocate(|c| live.contains(c)).expect("allocate"), "2");
        assert_eq!(ids.allocate(|c| live.contains(c)).expect("allocate"), "4");
    }

    #[test]
    fn reset_restarts_at_zero() {
        let mut ids = IdAllocator::new();
        let _ = ids.allocate(|_| false);
        ids.reset();
        assert_eq!(ids.peek(), 0);
    }

    #[test]
    fn exhausted_counter_is_storage_error() {
        let mut ids = IdAllocator { next: u64::MAX - 1 };
        assert!(ids.allocate(|_| false).is_ok());
        assert!(matches!(
            ids.allocate(|_| false),
            Err(GraphError::Storage(_))
        ));
    }
}
