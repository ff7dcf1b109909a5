use std::collections::VecDeque;

use super::metrics::Sample;

pub const DEFAULT_HISTORY_SIZE: usize = 1000;

/// Bounded ring buffer of samples, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    capacity: usize,
    samples: VecDeque<Sample>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_SIZE)
    }

    /// A capacity of zero is raised to one so the latest sample is always kept.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, sample: Sample) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// The most recent `min(n, len)` samples in chronological order.
    pub fn tail(&self, n: i64) -> Vec<Sample> {
        if n <= 0 {
            return Vec::new();
        }
        let take = usize::try_from(n).unwrap_or(usize::MAX).min(self.samples.len());
        self.samples
            .iter()
            .skip(self.samples.len() - take)
            .cloned()
            .collect()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
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

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
