//! Append-only decision log

use parking_lot::Mutex;
use voice_interrupt_core::TraceRecord;

/// In-memory trace of every decision, in append order
///
/// Unbounded. Rotation belongs to whoever embeds the classifier.
#[derive(Debug, Default)]
pub struct TraceLog {
    records: Mutex<Vec<TraceRecord>>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: TraceRecord) {
        self.records.lock().push(record);
    }

    /// Copy of all records so far
    pub fn snapshot(&self) -> Vec<TraceRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
