// src/pipeline/session.rs
//
// Session controller: start → feed sampled instants → finalize.
//
// Frames are processed strictly one at a time; the pose source is the
// only await point, so a frame that has started the pipeline always
// finishes it before the next instant is read.

use super::event_bus::{EventBus, PipelineEvent, SkipReason};
use super::metrics::{MetricsSummary, PipelineMetrics};
use super::sampler::{FrameSampler, Sample};
use super::sink::AnalysisSink;
use crate::analysis::aggregator::AggregateSummary;
use crate::analysis::analysis_pipeline::{AnalysisPipeline, AnalysisUpdate};
use crate::analysis::event_markers::MarkerKind;
use crate::pose_track::{PoseSource, SourceFrame};
use crate::types::{Config, MetricRecord, SkillLabel};
use anyhow::Result;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A marker resolved to its frame for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerReport {
    pub marker: MarkerKind,
    pub frame_index: usize,
    pub time: f64,
}

/// Everything left at the end of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub skill: SkillLabel,
    pub classified_skill: Option<SkillLabel>,
    pub summary: Option<AggregateSummary>,
    pub markers: Vec<MarkerReport>,
    pub tips: Vec<&'static str>,
    pub metrics: MetricsSummary,
    #[serde(skip)]
    pub frames: Vec<MetricRecord>,
}

pub struct Session {
    pipeline: AnalysisPipeline,
    sampler: FrameSampler,
    events: EventBus,
    metrics: PipelineMetrics,
    pace_realtime: bool,
    min_frames_for_export: usize,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            pipeline: AnalysisPipeline::new(&config.analysis, config.session.skill_mode),
            sampler: FrameSampler::new(config.sampling.target_fps),
            events: EventBus::new(config.session.max_pending_events),
            metrics: PipelineMetrics::new(),
            pace_realtime: config.sampling.pace_realtime,
            min_frames_for_export: config.session.min_frames_for_export,
        }
    }

    /// Clears all session state before the first frame of a new run.
    pub fn start(&mut self) {
        self.pipeline.reset();
        self.sampler.reset();
        self.events.clear();
        self.metrics = PipelineMetrics::new();
        info!("▶️  Session started");
    }

    /// Feeds one instant. Returns the analysis update when the instant was
    /// sampled, carried a pose, and was appended to the history.
    pub fn feed(&mut self, frame: SourceFrame) -> Option<AnalysisUpdate> {
        self.metrics.inc(&self.metrics.instants_seen);

        match self.sampler.sample(frame.time) {
            Sample::Due => {}
            Sample::NotDue => {
                self.metrics.inc(&self.metrics.frames_sampled_out);
                return None;
            }
            Sample::Backwards => {
                self.skip(frame.time, SkipReason::OutOfOrder);
                return None;
            }
        }

        let Some(pose) = frame.pose else {
            self.skip(frame.time, SkipReason::NoPose);
            return None;
        };

        let started = Instant::now();
        let update = self
            .pipeline
            .process_frame(&pose, frame.time, &mut self.events);
        self.metrics.set_timing(
            &self.metrics.analysis_time_us,
            started.elapsed().as_micros() as u64,
        );

        match &update {
            Some(_) => {
                self.metrics.inc(&self.metrics.frames_analyzed);
                self.log_events();
            }
            None => self.skip(frame.time, SkipReason::OutOfOrder),
        }
        update
    }

    fn skip(&mut self, time: f64, reason: SkipReason) {
        let counter = match reason {
            SkipReason::NoPose => &self.metrics.frames_without_pose,
            SkipReason::OutOfOrder => &self.metrics.frames_out_of_order,
        };
        self.metrics.inc(counter);
        self.events
            .publish(PipelineEvent::FrameSkipped { time, reason });
        self.log_events();
    }

    /// Drives the source to exhaustion, pushing every update to `sink`.
    pub async fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<SessionReport>
    where
        S: PoseSource,
        K: AnalysisSink,
    {
        self.start();
        let wall_start = tokio::time::Instant::now();
        let mut media_start: Option<f64> = None;

        while let Some(frame) = source.next_frame().await? {
            if self.pace_realtime {
                let origin = *media_start.get_or_insert(frame.time);
                match pacing_deadline(wall_start, origin, frame.time) {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => warn!(
                        "Cannot pace frame at {}s (origin {}s), processing immediately",
                        frame.time, origin
                    ),
                }
            }

            if let Some(update) = self.feed(frame) {
                sink.on_update(&update, self.pipeline.history());
            }
        }

        Ok(self.finalize())
    }

    /// Final snapshot of the session. Does not clear anything.
    pub fn finalize(&self) -> SessionReport {
        let history = self.pipeline.history();
        let last = self.pipeline.last_update();

        let markers = self
            .pipeline
            .markers()
            .iter_set()
            .filter_map(|(marker, frame_index)| {
                history.get(frame_index).map(|f| MarkerReport {
                    marker,
                    frame_index,
                    time: f.time,
                })
            })
            .collect();

        let metrics = self.metrics.summary();
        info!(
            "⏹️  Session finished: {} frame(s) analysed, {} without pose, {} out of order, {} sampled out",
            metrics.frames_analyzed,
            metrics.frames_without_pose,
            metrics.frames_out_of_order,
            metrics.frames_sampled_out
        );
        if history.is_empty() {
            warn!("No frame with a pose was analysed; report is empty");
        }

        SessionReport {
            skill: last.map(|u| u.skill).unwrap_or(SkillLabel::General),
            classified_skill: last.map(|u| u.classified_skill),
            summary: last.map(|u| u.summary),
            markers,
            tips: last.map(|u| u.tips.clone()).unwrap_or_default(),
            metrics,
            frames: history.as_slice().to_vec(),
        }
    }

    /// Export needs more than a handful of frames to mean anything.
    pub fn can_export(&self) -> bool {
        self.frame_count() >= self.min_frames_for_export
    }

    pub fn frame_count(&self) -> usize {
        self.pipeline.history().len()
    }

    fn log_events(&mut self) {
        for event in self.events.drain() {
            match event {
                PipelineEvent::MarkerLocked {
                    marker,
                    frame_index,
                    time,
                } => info!(
                    "📍 {} locked at frame {} ({:.2}s)",
                    marker.as_str(),
                    frame_index,
                    time
                ),
                PipelineEvent::SkillChanged { .. } => {}
                PipelineEvent::FrameSkipped { time, reason } => match reason {
                    SkipReason::NoPose => debug!("No pose at {:.3}s, frame skipped", time),
                    SkipReason::OutOfOrder => warn!("Out-of-order frame at {:.3}s skipped", time),
                },
            }
        }
    }
}

/// Wall-clock instant at which media time `time` is due, or `None` when
/// the offset does not fit a `Duration`/`Instant`.
fn pacing_deadline(
    wall_start: tokio::time::Instant,
    origin: f64,
    time: f64,
) -> Option<tokio::time::Instant> {
    let offset = Duration::try_from_secs_f64((time - origin).max(0.0)).ok()?;
    wall_start.checked_add(offset)
}
