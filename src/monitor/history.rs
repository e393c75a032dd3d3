//! Bounded, newest-first sample history.

use std::collections::VecDeque;

use super::sample::Sample;

/// Upper bound on the slots reserved up front; larger histories grow on demand.
const PREALLOCATED: usize = 64;

/// Per-channel history holding at most `capacity` samples, newest first.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    capacity: usize,
    samples: VecDeque<Sample>,
}

impl HistoryBuffer {
    /// Create an empty history. `capacity` must be at least 1; the config
    /// layer rejects anything smaller before a monitor is built.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 1, "history capacity must be positive");
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity.min(PREALLOCATED)),
        }
    }

    /// Record a sample, evicting the oldest one when full.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push_front(sample);
        self.samples.truncate(self.capacity);
    }

    /// Most recent sample, if any has been recorded.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Comma-joined rendering of one component of every sample, newest first.
    pub fn render(&self, selector: u8) -> String {
        self.samples
            .iter()
            .map(|sample| sample.component(selector).to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
