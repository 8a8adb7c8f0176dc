// src/analysis/skill_classifier.rs
//
// Weighted rule table over the aggregate summary. Rules are not mutually
// exclusive: one observation can add points to several skills. The skill
// with the strictly highest score wins, ties go to the earlier skill in
// SCORED_SKILLS, and an all-zero board means "general".

use super::aggregator::AggregateSummary;
use crate::types::SkillLabel;
use serde::Serialize;
use tracing::trace;

/// Scored skills in tie-break priority order.
pub const SCORED_SKILLS: [SkillLabel; 3] = [SkillLabel::Serve, SkillLabel::Spike, SkillLabel::Set];

// ============================================================================
// RULE TABLE
// ============================================================================

/// The subset of the summary the rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierInput {
    pub jump_relative: f32,
    pub arm_ext_relative: f32,
    pub shoulder_ratio: Option<f32>,
    pub knee_median: Option<f32>,
}

impl From<&AggregateSummary> for ClassifierInput {
    fn from(summary: &AggregateSummary) -> Self {
        Self {
            jump_relative: summary.jump_relative,
            arm_ext_relative: summary.arm_ext_relative,
            shoulder_ratio: summary.shoulder_hip_median,
            knee_median: summary.knee_median,
        }
    }
}

pub struct ScoringRule {
    pub id: u8,
    pub label: SkillLabel,
    pub weight: u32,
    pub predicate: fn(&ClassifierInput) -> bool,
}

fn broad_shoulders(i: &ClassifierInput) -> bool {
    i.shoulder_ratio.is_some_and(|r| r > 1.05)
}

pub const RULES: [ScoringRule; 9] = [
    ScoringRule {
        id: 1,
        label: SkillLabel::Serve,
        weight: 2,
        predicate: |i| i.jump_relative < 0.18 && i.arm_ext_relative > 0.85,
    },
    ScoringRule {
        id: 2,
        label: SkillLabel::Serve,
        weight: 1,
        predicate: broad_shoulders,
    },
    ScoringRule {
        id: 3,
        label: SkillLabel::Serve,
        weight: 1,
        predicate: |i| i.knee_median.is_some_and(|k| k > 0.4 && k < 0.6),
    },
    ScoringRule {
        id: 4,
        label: SkillLabel::Spike,
        weight: 2,
        predicate: |i| i.jump_relative >= 0.18,
    },
    ScoringRule {
        id: 5,
        label: SkillLabel::Spike,
        weight: 2,
        predicate: |i| i.arm_ext_relative > 0.9,
    },
    ScoringRule {
        id: 6,
        label: SkillLabel::Spike,
        weight: 1,
        predicate: broad_shoulders,
    },
    ScoringRule {
        id: 7,
        label: SkillLabel::Set,
        weight: 2,
        predicate: |i| i.arm_ext_relative < 0.85,
    },
    ScoringRule {
        id: 8,
        label: SkillLabel::Set,
        weight: 1,
        predicate: |i| i.jump_relative < 0.15,
    },
    ScoringRule {
        id: 9,
        label: SkillLabel::Set,
        weight: 1,
        predicate: |i| i.knee_median.is_some_and(|k| k > 0.5),
    },
];

// ============================================================================
// SCORING
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkillScores {
    pub serve: u32,
    pub spike: u32,
    pub set: u32,
}

impl SkillScores {
    pub fn get(&self, label: SkillLabel) -> u32 {
        match label {
            SkillLabel::Serve => self.serve,
            SkillLabel::Spike => self.spike,
            SkillLabel::Set => self.set,
            SkillLabel::General => 0,
        }
    }

    fn add(&mut self, label: SkillLabel, points: u32) {
        match label {
            SkillLabel::Serve => self.serve += points,
            SkillLabel::Spike => self.spike += points,
            SkillLabel::Set => self.set += points,
            SkillLabel::General => {}
        }
    }

    /// Strictly highest score, earlier skill on ties, "general" when all zero.
    pub fn winner(&self) -> SkillLabel {
        let mut best = SkillLabel::General;
        let mut best_score = 0;
        for label in SCORED_SKILLS {
            let score = self.get(label);
            if score > best_score {
                best = label;
                best_score = score;
            }
        }
        best
    }
}

pub fn score(input: &ClassifierInput) -> SkillScores {
    let mut scores = SkillScores::default();
    for rule in RULES.iter().filter(|r| (r.predicate)(input)) {
        trace!("rule {} fired: {} +{}", rule.id, rule.label, rule.weight);
        scores.add(rule.label, rule.weight);
    }
    scores
}

pub fn classify(summary: &AggregateSummary) -> SkillLabel {
    score(&ClassifierInput::from(summary)).winner()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(jump: f32, arm: f32, shoulder: Option<f32>, knee: Option<f32>) -> ClassifierInput {
        ClassifierInput {
            jump_relative: jump,
            arm_ext_relative: arm,
            shoulder_ratio: shoulder,
            knee_median: knee,
        }
    }

    fn fired(i: &ClassifierInput) -> Vec<u8> {
        RULES
            .iter()
            .filter(|r| (r.predicate)(i))
            .map(|r| r.id)
            .collect()
    }

    #[test]
    fn test_rule_ids_are_ordered() {
        let ids: Vec<u8> = RULES.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=9).collect::<Vec<u8>>());
    }

    #[test]
    fn test_each_rule_threshold() {
        // rule 1 needs both a small jump and a long reach
        assert!(fired(&input(0.17, 0.86, None, None)).contains(&1));
        assert!(!fired(&input(0.18, 0.86, None, None)).contains(&1));
        assert!(!fired(&input(0.17, 0.85, None, None)).contains(&1));

        // rules 2 and 6 share the shoulder condition
        let broad = fired(&input(0.5, 0.5, Some(1.06), None));
        assert!(broad.contains(&2) && broad.contains(&6));
        assert!(!fired(&input(0.5, 0.5, Some(1.05), None)).contains(&2));

        // rule 3 band is open on both ends
        assert!(fired(&input(0.5, 0.5, None, Some(0.45))).contains(&3));
        assert!(!fired(&input(0.5, 0.5, None, Some(0.4))).contains(&3));
        assert!(!fired(&input(0.5, 0.5, None, Some(0.6))).contains(&3));

        assert!(fired(&input(0.18, 0.5, None, None)).contains(&4));
        assert!(fired(&input(0.0, 0.91, None, None)).contains(&5));
        assert!(!fired(&input(0.0, 0.9, None, None)).contains(&5));
        assert!(fired(&input(0.5, 0.84, None, None)).contains(&7));
        assert!(fired(&input(0.14, 0.9, None, None)).contains(&8));
        assert!(!fired(&input(0.15, 0.9, None, None)).contains(&8));
        assert!(fired(&input(0.5, 0.9, None, Some(0.51))).contains(&9));
    }

    #[test]
    fn test_missing_shoulder_and_knee_skip_rules() {
        let ids = fired(&input(0.16, 0.86, None, None));
        assert!(!ids.contains(&2));
        assert!(!ids.contains(&3));
        assert!(!ids.contains(&6));
        assert!(!ids.contains(&9));
    }

    #[test]
    fn test_high_jump_long_reach_is_spike() {
        let scores = score(&input(0.6, 1.1, Some(1.2), Some(0.45)));
        // serve: 2 + 3 ; spike: 4 + 5 + 6
        assert_eq!(scores, SkillScores { serve: 2, spike: 5, set: 0 });
        assert_eq!(scores.winner(), SkillLabel::Spike);
    }

    #[test]
    fn test_standing_reach_is_serve() {
        let scores = score(&input(0.05, 0.88, Some(1.1), Some(0.5)));
        // serve: 1 + 2 + 3 ; spike: 6 ; set: 8
        assert_eq!(scores, SkillScores { serve: 4, spike: 1, set: 1 });
        assert_eq!(scores.winner(), SkillLabel::Serve);
    }

    #[test]
    fn test_bent_arms_low_jump_is_set() {
        let scores = score(&input(0.1, 0.6, Some(1.0), Some(0.55)));
        // serve: 3 ; set: 7 + 8 + 9
        assert_eq!(scores.set, 4);
        assert_eq!(scores.winner(), SkillLabel::Set);
    }

    #[test]
    fn test_ties_follow_priority_order() {
        assert_eq!(
            SkillScores { serve: 2, spike: 2, set: 2 }.winner(),
            SkillLabel::Serve
        );
        assert_eq!(
            SkillScores { serve: 0, spike: 3, set: 3 }.winner(),
            SkillLabel::Spike
        );
    }

    #[test]
    fn test_all_zero_is_general() {
        assert_eq!(SkillScores::default().winner(), SkillLabel::General);
        // jump in [0.15, 0.18) and reach in [0.85, 0.9] with no shoulder/knee data
        let scores = score(&input(0.16, 0.85, None, None));
        assert_eq!(scores, SkillScores::default());
        assert_eq!(scores.winner(), SkillLabel::General);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let i = input(0.2, 0.95, Some(1.1), Some(0.3));
        let first = score(&i).winner();
        for _ in 0..10 {
            assert_eq!(score(&i).winner(), first);
        }
    }
}
