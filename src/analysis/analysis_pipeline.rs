// src/analysis/analysis_pipeline.rs
//
// Orchestrator for one analysis session. Single entry point:
// call process_frame() for every pose the sampler lets through.
//
// Per frame: extract → append → aggregate (full recompute) → classify →
// resolve skill (auto/manual) → update markers → tips.
//
// Owns the session-scoped state (history, markers, skill selection);
// reset() returns it to the session-start state.

use super::aggregator::{AggregateSummary, Aggregator};
use super::event_markers::{EventMarkerDetector, EventMarkers};
use super::metric_extractor::MetricExtractor;
use super::skill_classifier;
use super::tip_generator::generate_tips;
use crate::pipeline::event_bus::{EventBus, PipelineEvent};
use crate::pipeline::frame_history::FrameHistory;
use crate::types::{AnalysisConfig, MetricRecord, Pose, SkillLabel, SkillMode};
use tracing::{debug, info};

// ============================================================================
// OUTPUT
// ============================================================================

/// Read-only snapshot handed to the rendering sink after each frame.
#[derive(Debug, Clone)]
pub struct AnalysisUpdate {
    pub frame_index: usize,
    pub record: MetricRecord,
    pub summary: AggregateSummary,
    /// What the classifier said, whether or not it was used.
    pub classified_skill: SkillLabel,
    /// The skill tips and markers were computed for.
    pub skill: SkillLabel,
    pub markers: EventMarkers,
    pub tips: Vec<&'static str>,
}

// ============================================================================
// SKILL SELECTION
// ============================================================================

/// Current skill label plus the mode that decides who may change it.
#[derive(Debug, Clone, Copy)]
pub struct SkillSelection {
    mode: SkillMode,
    current: SkillLabel,
}

impl SkillSelection {
    pub fn new(mode: SkillMode) -> Self {
        let current = match mode {
            SkillMode::Auto => SkillLabel::General,
            SkillMode::Manual(label) => label,
        };
        Self { mode, current }
    }

    /// Auto mode adopts the classifier output; manual mode keeps its label.
    pub fn resolve(&mut self, classified: SkillLabel) -> SkillLabel {
        if self.mode == SkillMode::Auto {
            self.current = classified;
        }
        self.current
    }

    pub fn current(&self) -> SkillLabel {
        self.current
    }

    pub fn mode(&self) -> SkillMode {
        self.mode
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct AnalysisPipeline {
    extractor: MetricExtractor,
    aggregator: Aggregator,
    marker_detector: EventMarkerDetector,
    history: FrameHistory,
    markers: EventMarkers,
    selection: SkillSelection,
    last_update: Option<AnalysisUpdate>,
}

impl AnalysisPipeline {
    pub fn new(config: &AnalysisConfig, mode: SkillMode) -> Self {
        Self {
            extractor: MetricExtractor::new(config.confidence_threshold),
            aggregator: Aggregator::new(config.baseline_window_secs),
            marker_detector: EventMarkerDetector::new(config.takeoff_jump_threshold),
            history: FrameHistory::new(),
            markers: EventMarkers::default(),
            selection: SkillSelection::new(mode),
            last_update: None,
        }
    }

    /// Clears history, markers and skill selection.
    pub fn reset(&mut self) {
        self.history.clear();
        self.markers.clear();
        self.selection = SkillSelection::new(self.selection.mode());
        self.last_update = None;
    }

    /// Runs the full per-frame pipeline. Returns `None` only when the frame
    /// could not be appended (time did not move forward).
    pub fn process_frame(
        &mut self,
        pose: &Pose,
        time: f64,
        events: &mut EventBus,
    ) -> Option<AnalysisUpdate> {
        let record = self.extractor.extract(pose, time);
        let frame_index = self.history.push(record)?;

        let frames = self.history.as_slice();
        let summary = self.aggregator.summarize(frames)?;

        let previous_skill = self.selection.current();
        let classified_skill = skill_classifier::classify(&summary);
        let skill = self.selection.resolve(classified_skill);

        if skill != previous_skill {
            info!(
                "🏐 Skill: {} → {} at frame {} ({:.2}s)",
                previous_skill, skill, frame_index, time
            );
            events.publish(PipelineEvent::SkillChanged {
                from: previous_skill,
                to: skill,
                frame_index,
            });
        }

        let locked = self
            .marker_detector
            .update(&mut self.markers, frames, &summary, skill);
        for marker in locked {
            if let Some(idx) = self.markers.get(marker) {
                let marker_time = frames[idx].time;
                events.publish(PipelineEvent::MarkerLocked {
                    marker,
                    frame_index: idx,
                    time: marker_time,
                });
            }
        }

        let tips = generate_tips(skill, &summary);

        debug!(
            "Frame {} @ {:.3}s: jump={:.2} reach={:.2} skill={} (classified {})",
            frame_index,
            time,
            summary.jump_relative,
            summary.arm_ext_relative,
            skill,
            classified_skill
        );

        let update = AnalysisUpdate {
            frame_index,
            record,
            summary,
            classified_skill,
            skill,
            markers: self.markers,
            tips,
        };
        self.last_update = Some(update.clone());
        Some(update)
    }

    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    pub fn markers(&self) -> &EventMarkers {
        &self.markers
    }

    pub fn last_update(&self) -> Option<&AnalysisUpdate> {
        self.last_update.as_ref()
    }
}
