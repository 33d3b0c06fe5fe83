use std::collections::VecDeque;
use std::sync::Arc;

use parley_core::Record;

/// Append-only, in-order store of every record the relay has accepted.
///
/// Unbounded by default. With a limit set, only the most recent `limit`
/// records are retained and replayed; older ones fall off the front.
#[derive(Debug, Default)]
pub struct MessageLog {
    records: VecDeque<Arc<Record>>,
    limit: Option<usize>,
    total_appended: u64,
}

impl MessageLog {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Ring-window variant. A limit of zero is treated as one.
    pub fn bounded(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit.clamp(1, 1024)),
            limit: Some(limit.max(1)),
            total_appended: 0,
        }
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        match limit {
            Some(n) => Self::bounded(n),
            None => Self::unbounded(),
        }
    }

    /// Add a record at the end. Returns its zero-based append sequence.
    pub fn append(&mut self, record: Arc<Record>) -> u64 {
        if let Some(limit) = self.limit {
            while self.records.len() >= limit {
                self.records.pop_front();
            }
        }
        self.records.push_back(record);
        let seq = self.total_appended;
        self.total_appended += 1;
        seq
    }

    /// Every retained record, oldest first.
    pub fn snapshot(&self) -> Vec<Arc<Record>> {
        self.records.iter().cloned().collect()
    }

    /// Retained records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ever appended, evicted ones included.
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
