// src/analysis/aggregator.rs
//
// Recomputes the session summary from the whole frame history on every
// call. Nothing is carried between calls, so the summary can never drift
// from the history it was built from.

use crate::types::MetricRecord;
use serde::Serialize;

/// Torso length used when the history has no usable torso measurement.
const FALLBACK_TORSO_LEN: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSummary {
    pub frame_count: usize,
    /// Resting hip height (larger y = lower in the image).
    pub baseline_hip_y: f32,
    /// Highest point the hips reached.
    pub min_hip_y: f32,
    /// Lowest point the hips reached (deepest crouch).
    pub max_hip_y: f32,
    pub jump_px: f32,
    pub torso_median: f32,
    pub jump_relative: f32,
    pub arm_ext_max: f32,
    pub arm_ext_min: f32,
    pub arm_ext_relative: f32,
    pub shoulder_hip_median: Option<f32>,
    /// Median over both legs; `None` when no frame had a usable knee.
    pub knee_median: Option<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    baseline_window_secs: f64,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Aggregator {
    pub fn new(baseline_window_secs: f64) -> Self {
        Self {
            baseline_window_secs,
        }
    }

    /// `None` only for an empty history.
    pub fn summarize(&self, frames: &[MetricRecord]) -> Option<AggregateSummary> {
        let first = frames.first()?;

        let baseline_hip_y = median(
            frames
                .iter()
                .filter(|f| f.time < self.baseline_window_secs)
                .map(|f| f.hip_y)
                .collect(),
        )
        .unwrap_or(first.hip_y);

        let (min_hip_y, max_hip_y) = min_max(frames.iter().map(|f| f.hip_y));
        let (arm_ext_min, arm_ext_max) = min_max(frames.iter().map(|f| f.arm_ext));

        // zero-length torsos come from collapsed detections, not real bodies
        let torso_median = median(
            frames
                .iter()
                .map(|f| f.torso_len)
                .filter(|v| v.is_finite() && *v > 0.0)
                .collect(),
        )
        .filter(|m| *m > 0.0)
        .unwrap_or(FALLBACK_TORSO_LEN);

        let jump_px = (baseline_hip_y - min_hip_y).max(0.0);

        let shoulder_hip_median = median(
            frames
                .iter()
                .map(|f| f.shoulder_hip_ratio)
                .filter(|v| v.is_finite() && *v > 0.0)
                .collect(),
        );

        let knee_median = median(
            frames
                .iter()
                .flat_map(|f| [f.left_knee_bend, f.right_knee_bend])
                .flatten()
                .filter(|v| v.is_finite())
                .collect(),
        );

        Some(AggregateSummary {
            frame_count: frames.len(),
            baseline_hip_y,
            min_hip_y,
            max_hip_y,
            jump_px,
            torso_median,
            jump_relative: jump_px / torso_median,
            arm_ext_max,
            arm_ext_min,
            arm_ext_relative: arm_ext_max / torso_median,
            shoulder_hip_median,
            knee_median,
        })
    }
}

/// Median with the mean of the two middle values for even lengths.
pub fn median(mut values: Vec<f32>) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

fn min_max(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(time: f64, hip_y: f32, torso_len: f32, arm_ext: f32) -> MetricRecord {
        MetricRecord {
            time,
            hip_y,
            torso_len,
            arm_ext,
            shoulder_hip_ratio: 1.0,
            left_knee_bend: None,
            right_knee_bend: None,
        }
    }

    #[test]
    fn test_empty_history_has_no_summary() {
        assert!(Aggregator::default().summarize(&[]).is_none());
    }

    #[test]
    fn test_two_frame_jump_scenario() {
        let frames = vec![record(0.0, 100.0, 50.0, 10.0), record(0.5, 70.0, 50.0, 45.0)];
        let summary = Aggregator::default().summarize(&frames).unwrap();

        // both frames sit inside the baseline window: median(100, 70)
        assert!((summary.baseline_hip_y - 85.0).abs() < 1e-5);
        assert_eq!(summary.min_hip_y, 70.0);
        assert!((summary.jump_px - 15.0).abs() < 1e-5);
        assert!((summary.jump_relative - 0.3).abs() < 1e-5);
        assert!((summary.arm_ext_relative - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_baseline_from_early_frames_only() {
        let frames = vec![
            record(0.0, 100.0, 50.0, 10.0),
            record(1.5, 70.0, 50.0, 45.0),
        ];
        let summary = Aggregator::default().summarize(&frames).unwrap();

        assert_eq!(summary.baseline_hip_y, 100.0);
        assert!((summary.jump_px - 30.0).abs() < 1e-5);
        assert!((summary.jump_relative - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_cold_start_baseline_is_first_frame() {
        let frames = vec![
            record(2.0, 120.0, 60.0, 10.0),
            record(2.1, 90.0, 60.0, 10.0),
            record(2.2, 100.0, 60.0, 10.0),
        ];
        let summary = Aggregator::default().summarize(&frames).unwrap();
        assert_eq!(summary.baseline_hip_y, 120.0);
        assert_eq!(summary.max_hip_y, 120.0);
        assert!((summary.jump_relative - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_knee_median_skips_missing_sides() {
        let mut a = record(0.0, 100.0, 50.0, 10.0);
        a.left_knee_bend = Some(0.3);
        a.right_knee_bend = Some(0.5);
        let mut b = record(0.1, 100.0, 50.0, 10.0);
        b.left_knee_bend = None;
        b.right_knee_bend = Some(0.7);

        let summary = Aggregator::default().summarize(&[a, b]).unwrap();
        assert!((summary.knee_median.unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_no_knee_data_is_distinct_from_zero() {
        let frames = vec![record(0.0, 100.0, 50.0, 10.0)];
        let summary = Aggregator::default().summarize(&frames).unwrap();
        assert_eq!(summary.knee_median, None);
    }

    #[test]
    fn test_zero_torso_falls_back_to_one() {
        let frames = vec![record(0.0, 100.0, 0.0, 10.0), record(0.2, 90.0, 0.0, 12.0)];
        let summary = Aggregator::default().summarize(&frames).unwrap();

        assert_eq!(summary.torso_median, 1.0);
        assert!(summary.jump_relative.is_finite());
        assert!(summary.arm_ext_relative.is_finite());
        assert!((summary.arm_ext_relative - 12.0).abs() < 1e-5);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let frames: Vec<MetricRecord> = (0..40)
            .map(|i| {
                let t = i as f64 / 12.0;
                let mut r = record(t, 200.0 - (i % 9) as f32 * 4.0, 180.0, (i * 3) as f32);
                r.left_knee_bend = (i % 3 != 0).then_some(0.4 + (i % 5) as f32 * 0.02);
                r
            })
            .collect();

        let aggregator = Aggregator::default();
        let first = aggregator.summarize(&frames).unwrap();
        let second = aggregator.summarize(&frames).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(vec![]), None);
    }
}
