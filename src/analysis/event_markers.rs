// src/analysis/event_markers.rs
//
// Frames of interest within a jump/swing cycle.
//
// peak and contact always point at the current extremum and move as frames
// arrive. takeoff and toss lock on the first qualifying update and are
// never revisited within the session.
//
// Every "frame with value V" lookup resolves to the earliest such frame.

use super::aggregator::AggregateSummary;
use crate::types::{MetricRecord, SkillLabel};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MarkerKind {
    Takeoff,
    Peak,
    Contact,
    Toss,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 4] = [
        MarkerKind::Takeoff,
        MarkerKind::Peak,
        MarkerKind::Contact,
        MarkerKind::Toss,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Takeoff => "Takeoff",
            Self::Peak => "Peak",
            Self::Contact => "Contact",
            Self::Toss => "Toss",
        }
    }
}

/// A slot that may go from `Unset` to `Set` once per session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteOnce {
    #[default]
    Unset,
    Set(usize),
}

impl WriteOnce {
    /// Returns true if this call performed the transition.
    fn lock(&mut self, frame_index: usize) -> bool {
        match self {
            Self::Unset => {
                *self = Self::Set(frame_index);
                true
            }
            Self::Set(_) => false,
        }
    }

    pub fn get(&self) -> Option<usize> {
        match self {
            Self::Unset => None,
            Self::Set(idx) => Some(*idx),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }
}

/// Marker slots, each an index into the session's frame history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventMarkers {
    pub takeoff: WriteOnce,
    pub peak: Option<usize>,
    pub contact: Option<usize>,
    pub toss: WriteOnce,
}

impl EventMarkers {
    pub fn get(&self, kind: MarkerKind) -> Option<usize> {
        match kind {
            MarkerKind::Takeoff => self.takeoff.get(),
            MarkerKind::Peak => self.peak,
            MarkerKind::Contact => self.contact,
            MarkerKind::Toss => self.toss.get(),
        }
    }

    /// Set markers in display order.
    pub fn iter_set(&self) -> impl Iterator<Item = (MarkerKind, usize)> + '_ {
        MarkerKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|idx| (kind, idx)))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EventMarkerDetector {
    takeoff_jump_threshold: f32,
}

impl Default for EventMarkerDetector {
    fn default() -> Self {
        Self::new(0.15)
    }
}

impl EventMarkerDetector {
    pub fn new(takeoff_jump_threshold: f32) -> Self {
        Self {
            takeoff_jump_threshold,
        }
    }

    /// Updates `markers` for the current history and returns the markers
    /// that were locked by this call.
    pub fn update(
        &self,
        markers: &mut EventMarkers,
        frames: &[MetricRecord],
        summary: &AggregateSummary,
        skill: SkillLabel,
    ) -> Vec<MarkerKind> {
        let mut locked = Vec::new();

        if !markers.takeoff.is_set() && summary.jump_relative > self.takeoff_jump_threshold {
            // deepest crouch (largest hip y) seen so far
            if let Some(idx) = first_extreme(frames, |f| f.hip_y, Extreme::Max) {
                if markers.takeoff.lock(idx) {
                    locked.push(MarkerKind::Takeoff);
                }
            }
        }

        markers.peak = first_extreme(frames, |f| f.hip_y, Extreme::Min);
        markers.contact = first_extreme(frames, |f| f.arm_ext, Extreme::Max);

        if skill == SkillLabel::Serve && !markers.toss.is_set() {
            // arm drawn in before the toss
            if let Some(idx) = first_extreme(frames, |f| f.arm_ext, Extreme::Min) {
                if markers.toss.lock(idx) {
                    locked.push(MarkerKind::Toss);
                }
            }
        }

        locked
    }
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

/// Index of the first frame holding the extreme value of `key`.
fn first_extreme<F>(frames: &[MetricRecord], key: F, extreme: Extreme) -> Option<usize>
where
    F: Fn(&MetricRecord) -> f32,
{
    let mut best: Option<(usize, f32)> = None;
    for (idx, frame) in frames.iter().enumerate() {
        let value = key(frame);
        let better = match best {
            None => true,
            Some((_, current)) => match extreme {
                Extreme::Min => value < current,
                Extreme::Max => value > current,
            },
        };
        if better {
            best = Some((idx, value));
        }
    }
    best.map(|(idx, _)| idx)
}
