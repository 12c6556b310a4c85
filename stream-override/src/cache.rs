//! Fallback cache for original stream durations.
//!
//! Replacement streaming data often lacks an exact duration. The original
//! duration is recorded here before the override and read back when the
//! player measures the stream length.

use std::sync::{Mutex, PoisonError};

use indexmap::IndexMap;
use stream_override_core::{DurationMs, UNSET_DURATION, VideoId, is_unset};
use tracing::{debug, trace};

/// Default number of identifiers kept.
pub const DEFAULT_CAPACITY: usize = 5;

/// Bounded identifier → original duration map.
///
/// Eviction is first-in first-out by *insertion*: overwriting an identifier
/// keeps its original position, and reads do not refresh anything. Only the
/// last handful of sessions ever needs a fallback.
#[derive(Debug)]
pub struct DurationFallbackCache {
    capacity: usize,
    entries: Mutex<IndexMap<VideoId, DurationMs>>,
}

impl DurationFallbackCache {
    /// Creates a cache holding at most `capacity` identifiers (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(IndexMap::with_capacity(capacity + 1)),
        }
    }

    /// Maximum number of identifiers kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records the original duration for `id`.
    ///
    /// [`UNSET_DURATION`] is ignored. Returns the identifier evicted to make
    /// room, if any.
    pub fn record(&self, id: VideoId, duration_ms: DurationMs) -> Option<VideoId> {
        if is_unset(duration_ms) {
            trace!(video_id = %id, "Ignoring unset duration");
            return None;
        }

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(id, duration_ms);

        let mut evicted = None;
        while entries.len() > self.capacity {
            if let Some((oldest, _)) = entries.shift_remove_index(0) {
                debug!(video_id = %oldest, "Evicted fallback duration");
                evicted = Some(oldest);
            }
        }
        evicted
    }

    /// Returns the recorded duration for `id`, or [`UNSET_DURATION`].
    pub fn resolve(&self, id: &str) -> DurationMs {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
            .unwrap_or(UNSET_DURATION)
    }

    /// Number of recorded identifiers.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DurationFallbackCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
