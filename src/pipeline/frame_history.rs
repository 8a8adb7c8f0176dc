// src/pipeline/frame_history.rs
//
// Append-only record of every analysed frame in the current session.
// Indices handed out by push() stay valid until clear().

use crate::types::MetricRecord;
use tracing::warn;

#[derive(Debug, Default, Clone)]
pub struct FrameHistory {
    frames: Vec<MetricRecord>,
}

impl FrameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns its index. Records that do not move
    /// time strictly forward are refused.
    pub fn push(&mut self, record: MetricRecord) -> Option<usize> {
        if let Some(last) = self.frames.last() {
            if record.time <= last.time {
                warn!(
                    "Refusing out-of-order frame at {:.3}s (last was {:.3}s)",
                    record.time, last.time
                );
                return None;
            }
        }
        self.frames.push(record);
        Some(self.frames.len() - 1)
    }

    pub fn get(&self, index: usize) -> Option<&MetricRecord> {
        self.frames.get(index)
    }

    pub fn as_slice(&self) -> &[MetricRecord] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::tests::record;

    #[test]
    fn test_push_returns_stable_indices() {
        let mut history = FrameHistory::new();
        assert_eq!(history.push(record(0.0, 100.0, 50.0, 10.0)), Some(0));
        assert_eq!(history.push(record(0.1, 90.0, 50.0, 10.0)), Some(1));
        assert_eq!(history.get(1).map(|r| r.hip_y), Some(90.0));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_refuses_non_increasing_time() {
        let mut history = FrameHistory::new();
        history.push(record(0.5, 100.0, 50.0, 10.0));
        assert_eq!(history.push(record(0.5, 90.0, 50.0, 10.0)), None);
        assert_eq!(history.push(record(0.4, 90.0, 50.0, 10.0)), None);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_clear_empties_history() {
        let mut history = FrameHistory::new();
        history.push(record(0.0, 100.0, 50.0, 10.0));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.push(record(0.0, 100.0, 50.0, 10.0)), Some(0));
    }
}
