// src/analysis/tip_generator.rs
//
// Coaching tips per skill. Each skill has its own rule list; rules run in
// order and every match is kept.

use super::aggregator::AggregateSummary;
use crate::types::SkillLabel;

pub fn generate_tips(skill: SkillLabel, summary: &AggregateSummary) -> Vec<&'static str> {
    let mut tips = Vec::new();
    let jump = summary.jump_relative;
    let reach = summary.arm_ext_relative;
    let knee = summary.knee_median;

    match skill {
        SkillLabel::General => {
            if jump < 0.15 {
                tips.push("Jump seems low.");
            } else if jump > 0.3 {
                tips.push("Good vertical!");
            }
            if reach < 0.9 {
                tips.push("Extend arm fully.");
            } else {
                tips.push("Good arm extension.");
            }
        }
        SkillLabel::Serve => {
            if reach < 0.95 {
                tips.push("Extend hitting arm more.");
            }
            if knee.is_some_and(|k| k < 0.4) {
                tips.push("Add slight knee bend.");
            }
            tips.push("Work on toss consistency.");
        }
        SkillLabel::Spike => {
            if jump < 0.2 {
                tips.push("Increase vertical.");
            }
            if reach < 1.0 {
                tips.push("Reach higher at contact.");
            }
            tips.push("Snap wrist over the ball.");
        }
        SkillLabel::Set => {
            if reach > 0.8 {
                tips.push("Keep elbows bent slightly.");
            }
            if knee.is_some_and(|k| k < 0.5) {
                tips.push("Use more knee bend.");
            }
            tips.push("Ensure both hands contact ball evenly.");
        }
    }

    tips
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(jump: f32, reach: f32, knee: Option<f32>) -> AggregateSummary {
        AggregateSummary {
            frame_count: 10,
            baseline_hip_y: 200.0,
            min_hip_y: 200.0 - jump * 100.0,
            max_hip_y: 200.0,
            jump_px: jump * 100.0,
            torso_median: 100.0,
            jump_relative: jump,
            arm_ext_max: reach * 100.0,
            arm_ext_min: 0.0,
            arm_ext_relative: reach,
            shoulder_hip_median: Some(1.0),
            knee_median: knee,
        }
    }

    #[test]
    fn test_general_tips() {
        assert_eq!(
            generate_tips(SkillLabel::General, &summary(0.1, 0.5, None)),
            vec!["Jump seems low.", "Extend arm fully."]
        );
        assert_eq!(
            generate_tips(SkillLabel::General, &summary(0.4, 0.95, None)),
            vec!["Good vertical!", "Good arm extension."]
        );
        // middle band jump gets no jump tip
        assert_eq!(
            generate_tips(SkillLabel::General, &summary(0.2, 0.9, None)),
            vec!["Good arm extension."]
        );
    }

    #[test]
    fn test_serve_tips() {
        assert_eq!(
            generate_tips(SkillLabel::Serve, &summary(0.05, 0.9, Some(0.3))),
            vec![
                "Extend hitting arm more.",
                "Add slight knee bend.",
                "Work on toss consistency."
            ]
        );
        assert_eq!(
            generate_tips(SkillLabel::Serve, &summary(0.05, 1.0, None)),
            vec!["Work on toss consistency."]
        );
    }

    #[test]
    fn test_spike_tips() {
        assert_eq!(
            generate_tips(SkillLabel::Spike, &summary(0.1, 0.9, None)),
            vec![
                "Increase vertical.",
                "Reach higher at contact.",
                "Snap wrist over the ball."
            ]
        );
        assert_eq!(
            generate_tips(SkillLabel::Spike, &summary(0.5, 1.2, None)),
            vec!["Snap wrist over the ball."]
        );
    }

    #[test]
    fn test_set_tips() {
        assert_eq!(
            generate_tips(SkillLabel::Set, &summary(0.05, 0.85, Some(0.45))),
            vec![
                "Keep elbows bent slightly.",
                "Use more knee bend.",
                "Ensure both hands contact ball evenly."
            ]
        );
        // no knee data never triggers the knee tip
        assert_eq!(
            generate_tips(SkillLabel::Set, &summary(0.05, 0.6, None)),
            vec!["Ensure both hands contact ball evenly."]
        );
    }
}
