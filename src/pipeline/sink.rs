// src/pipeline/sink.rs
//
// Where per-frame analysis updates go. Drawing is someone else's job;
// the default sink renders the metric panel into the log.

use crate::analysis::analysis_pipeline::AnalysisUpdate;
use crate::analysis::aggregator::AggregateSummary;
use crate::pipeline::frame_history::FrameHistory;
use crate::types::SkillLabel;
use tracing::debug;

pub trait AnalysisSink {
    fn on_update(&mut self, update: &AnalysisUpdate, history: &FrameHistory);
}

/// Collects every update; handy for tests and offline consumers.
impl AnalysisSink for Vec<AnalysisUpdate> {
    fn on_update(&mut self, update: &AnalysisUpdate, _history: &FrameHistory) {
        self.push(update.clone());
    }
}

/// Label/value pairs shown in the metrics panel.
pub fn metric_panel(skill: SkillLabel, summary: &AggregateSummary) -> Vec<(&'static str, String)> {
    vec![
        ("Skill", skill.to_string()),
        ("Jump (rel)", format!("{:.2}", summary.jump_relative)),
        ("Arm reach", format!("{:.2}", summary.arm_ext_relative)),
        (
            "Shoulder/Hip",
            format!("{:.2}", summary.shoulder_hip_median.unwrap_or(0.0)),
        ),
        (
            "Knee bend",
            summary
                .knee_median
                .map(|k| format!("{:.2}", k))
                .unwrap_or_else(|| "n/a".to_string()),
        ),
    ]
}

#[derive(Debug, Default)]
pub struct LogSink;

impl AnalysisSink for LogSink {
    fn on_update(&mut self, update: &AnalysisUpdate, history: &FrameHistory) {
        let panel = metric_panel(update.skill, &update.summary)
            .into_iter()
            .map(|(label, value)| format!("{}={}", label, value))
            .collect::<Vec<_>>()
            .join(" | ");
        let record = &update.record;
        debug!(
            "📊 [{}] t={:.3}s hipY={:.1} armExt={:.1} | {}",
            update.frame_index, record.time, record.hip_y, record.arm_ext, panel
        );

        for (kind, idx) in update.markers.iter_set() {
            if let Some(frame) = history.get(idx) {
                debug!("   📍 {} @ {:.2}s (frame {})", kind.as_str(), frame.time, idx);
            }
        }
        for tip in &update.tips {
            debug!("   💡 {}", tip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::tests::record;
    use crate::analysis::aggregator::Aggregator;

    #[test]
    fn test_metric_panel_formatting() {
        let mut frame = record(0.0, 100.0, 50.0, 45.0);
        frame.left_knee_bend = Some(0.456);
        let summary = Aggregator::default().summarize(&[frame]).unwrap();

        let panel = metric_panel(SkillLabel::Serve, &summary);
        assert_eq!(panel[0], ("Skill", "serve".to_string()));
        assert_eq!(panel[1], ("Jump (rel)", "0.00".to_string()));
        assert_eq!(panel[2], ("Arm reach", "0.90".to_string()));
        assert_eq!(panel[3], ("Shoulder/Hip", "1.00".to_string()));
        assert_eq!(panel[4], ("Knee bend", "0.46".to_string()));
    }

    #[test]
    fn test_metric_panel_without_knee_data() {
        let summary = Aggregator::default()
            .summarize(&[record(0.0, 100.0, 50.0, 45.0)])
            .unwrap();
        let panel = metric_panel(SkillLabel::General, &summary);
        assert_eq!(panel[4].1, "n/a");
    }
}
