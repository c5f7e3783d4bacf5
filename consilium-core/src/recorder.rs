//! Action recorder — bounded log of applied suggestions.
//!
//! Feeds future offline retraining. The log is a fixed-capacity ring:
//! appends never fail and never block beyond the uncontended lock, and
//! when the ring is full the chronologically oldest entry is evicted, so
//! a long-running session cannot grow memory without bound.

use std::collections::VecDeque;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::capture::FrameRef;

/// One recorded action: what was suggested, when, and against which frame.
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAction {
    /// Milliseconds since the recorder's epoch (monotonic, not wall clock).
    pub timestamp_ms: u64,
    /// Suggestion label that was applied.
    pub label: String,
    /// Opaque handle to the frame the suggestion was derived from.
    pub frame_ref: FrameRef,
}

/// Capacity-bounded, append-only action log.
pub struct ActionRecorder {
    epoch: Instant,
    capacity: usize,
    entries: Mutex<VecDeque<GameAction>>,
}

impl ActionRecorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            epoch: Instant::now(),
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    /// Append an action, evicting the oldest entry when at capacity.
    pub fn record(&self, label: impl Into<String>, frame_ref: FrameRef) {
        if self.capacity == 0 {
            return;
        }
        let action = GameAction {
            timestamp_ms: self.epoch.elapsed().as_millis() as u64,
            label: label.into(),
            frame_ref,
        };
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(action);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Chronological copy of the log, oldest first. This is the feed a
    /// future trainer would consume.
    pub fn snapshot(&self) -> Vec<GameAction> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
