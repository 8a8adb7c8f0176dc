// src/pipeline/event_bus.rs
//
// Session-level notifications. The analysis pipeline publishes, the
// session drains and logs after each frame.

use crate::analysis::event_markers::MarkerKind;
use crate::types::SkillLabel;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    NoPose,
    OutOfOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PipelineEvent {
    SkillChanged {
        from: SkillLabel,
        to: SkillLabel,
        frame_index: usize,
    },

    MarkerLocked {
        marker: MarkerKind,
        frame_index: usize,
        time: f64,
    },

    FrameSkipped {
        time: f64,
        reason: SkipReason,
    },
}

pub struct EventBus {
    events: VecDeque<PipelineEvent>,
    max_pending: usize,
}

impl EventBus {
    pub fn new(max_pending: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_pending),
            max_pending: max_pending.max(1),
        }
    }

    pub fn publish(&mut self, event: PipelineEvent) {
        if self.events.len() >= self.max_pending {
            warn!(
                "Event bus full ({} events), dropping oldest",
                self.max_pending
            );
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<PipelineEvent> {
        self.events.drain(..).collect()
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skipped(time: f64) -> PipelineEvent {
        PipelineEvent::FrameSkipped {
            time,
            reason: SkipReason::NoPose,
        }
    }

    #[test]
    fn test_drops_oldest_when_full() {
        let mut bus = EventBus::new(2);
        bus.publish(skipped(0.0));
        bus.publish(skipped(0.1));
        bus.publish(skipped(0.2));

        assert_eq!(bus.pending_count(), 2);
        assert_eq!(bus.drain(), vec![skipped(0.1), skipped(0.2)]);
        assert_eq!(bus.pending_count(), 0);
    }
}
