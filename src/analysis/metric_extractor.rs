// src/analysis/metric_extractor.rs
//
// Pose → MetricRecord. Pure, no memory of earlier frames.
//
// Midpoints are taken unconditionally. Arm extension and knee bend are
// gated on joint confidence and degrade to 0 / None instead of failing.

use crate::types::{Joint, JointName, MetricRecord, Pose};

#[derive(Debug, Clone, Copy)]
pub struct MetricExtractor {
    confidence_threshold: f32,
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl MetricExtractor {
    pub fn new(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
        }
    }

    pub fn extract(&self, pose: &Pose, time: f64) -> MetricRecord {
        let hip_mid = midpoint(
            pose.joint(JointName::LeftHip),
            pose.joint(JointName::RightHip),
        );
        let shoulder_mid = midpoint(
            pose.joint(JointName::LeftShoulder),
            pose.joint(JointName::RightShoulder),
        );
        let ankle_mid = midpoint(
            pose.joint(JointName::LeftAnkle),
            pose.joint(JointName::RightAnkle),
        );

        let torso_len = distance(shoulder_mid, ankle_mid);

        let left_arm = self.arm_extension(pose, JointName::LeftWrist, JointName::LeftShoulder);
        let right_arm = self.arm_extension(pose, JointName::RightWrist, JointName::RightShoulder);

        MetricRecord {
            time,
            hip_y: hip_mid.1,
            torso_len,
            arm_ext: left_arm.max(right_arm),
            shoulder_hip_ratio: shoulder_hip_ratio(pose),
            left_knee_bend: self.knee_bend(
                pose,
                JointName::LeftHip,
                JointName::LeftKnee,
                JointName::LeftAnkle,
            ),
            right_knee_bend: self.knee_bend(
                pose,
                JointName::RightHip,
                JointName::RightKnee,
                JointName::RightAnkle,
            ),
        }
    }

    fn is_confident(&self, joint: &Joint) -> bool {
        joint.confidence > self.confidence_threshold
    }

    /// Wrist-to-shoulder distance, 0 when either joint is unreliable.
    fn arm_extension(&self, pose: &Pose, wrist: JointName, shoulder: JointName) -> f32 {
        let wrist = pose.joint(wrist);
        let shoulder = pose.joint(shoulder);
        if self.is_confident(wrist) && self.is_confident(shoulder) {
            wrist.distance_to(shoulder)
        } else {
            0.0
        }
    }

    /// Vertical position of the knee between hip (0) and ankle (1).
    fn knee_bend(
        &self,
        pose: &Pose,
        hip: JointName,
        knee: JointName,
        ankle: JointName,
    ) -> Option<f32> {
        let hip = pose.joint(hip);
        let knee = pose.joint(knee);
        let ankle = pose.joint(ankle);
        if !(self.is_confident(hip) && self.is_confident(knee) && self.is_confident(ankle)) {
            return None;
        }

        let leg_span = ankle.y - hip.y;
        if leg_span == 0.0 {
            return None;
        }
        let bend = (knee.y - hip.y) / leg_span;
        bend.is_finite().then(|| bend.max(0.0))
    }
}

fn midpoint(a: &Joint, b: &Joint) -> (f32, f32) {
    ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn shoulder_hip_ratio(pose: &Pose) -> f32 {
    let shoulder_spread =
        (pose.joint(JointName::LeftShoulder).x - pose.joint(JointName::RightShoulder).x).abs();
    let hip_spread = (pose.joint(JointName::LeftHip).x - pose.joint(JointName::RightHip).x).abs();
    if hip_spread > 0.0 {
        shoulder_spread / hip_spread
    } else {
        1.0
    }
}
