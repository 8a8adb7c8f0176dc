// src/pipeline/metrics.rs
//
// Per-session counters and timing. Logged at the end of a track and
// embedded in the JSON summary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub instants_seen: Arc<AtomicU64>,
    pub frames_sampled_out: Arc<AtomicU64>,
    pub frames_without_pose: Arc<AtomicU64>,
    pub frames_out_of_order: Arc<AtomicU64>,
    pub frames_analyzed: Arc<AtomicU64>,
    pub analysis_time_us: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            instants_seen: Arc::new(AtomicU64::new(0)),
            frames_sampled_out: Arc::new(AtomicU64::new(0)),
            frames_without_pose: Arc::new(AtomicU64::new(0)),
            frames_out_of_order: Arc::new(AtomicU64::new(0)),
            frames_analyzed: Arc::new(AtomicU64::new(0)),
            analysis_time_us: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_timing(&self, counter: &AtomicU64, duration_us: u64) {
        counter.store(duration_us, Ordering::Relaxed);
    }

    /// Analysed frames per wall-clock second.
    pub fn fps(&self) -> f64 {
        let frames = self.frames_analyzed.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            instants_seen: self.instants_seen.load(Ordering::Relaxed),
            frames_sampled_out: self.frames_sampled_out.load(Ordering::Relaxed),
            frames_without_pose: self.frames_without_pose.load(Ordering::Relaxed),
            frames_out_of_order: self.frames_out_of_order.load(Ordering::Relaxed),
            frames_analyzed: self.frames_analyzed.load(Ordering::Relaxed),
            last_analysis_us: self.analysis_time_us.load(Ordering::Relaxed),
            fps: self.fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub instants_seen: u64,
    pub frames_sampled_out: u64,
    pub frames_without_pose: u64,
    pub frames_out_of_order: u64,
    pub frames_analyzed: u64,
    pub last_analysis_us: u64,
    pub fps: f64,
    pub elapsed_secs: f64,
}
