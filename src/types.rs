use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub sampling: SamplingConfig,
    pub session: SessionConfig,
    pub io: IoConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Joints at or below this score are ignored for arm extension and knee bend.
    pub confidence_threshold: f32,
    /// Frames captured before this instant form the resting baseline.
    pub baseline_window_secs: f64,
    /// Relative jump that locks the takeoff marker.
    pub takeoff_jump_threshold: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.3,
            baseline_window_secs: 1.0,
            takeoff_jump_threshold: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub target_fps: f64,
    pub pace_realtime: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            target_fps: 12.0,
            pace_realtime: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub skill_mode: SkillMode,
    pub min_frames_for_export: usize,
    pub max_pending_events: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            skill_mode: SkillMode::Auto,
            min_frames_for_export: 6,
            max_pending_events: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub save_csv: bool,
    pub save_json_summary: bool,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_dir: "pose_tracks".to_string(),
            output_dir: "output".to_string(),
            save_csv: true,
            save_json_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// JOINTS & POSES
// ============================================================================

/// The twelve body landmarks the analysis reads. Face keypoints are not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointName {
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl JointName {
    pub const COUNT: usize = 12;

    pub const ALL: [JointName; Self::COUNT] = [
        JointName::LeftShoulder,
        JointName::RightShoulder,
        JointName::LeftElbow,
        JointName::RightElbow,
        JointName::LeftWrist,
        JointName::RightWrist,
        JointName::LeftHip,
        JointName::RightHip,
        JointName::LeftKnee,
        JointName::RightKnee,
        JointName::LeftAnkle,
        JointName::RightAnkle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|j| j.as_str() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One tracked landmark in source-frame pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl Joint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    pub fn distance_to(&self, other: &Joint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Every joint of [`JointName::ALL`] for a single video instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    joints: [Joint; JointName::COUNT],
}

impl Pose {
    /// Builds a pose from named joints. Returns `None` unless all twelve
    /// joints are present; the first occurrence of a repeated name wins.
    pub fn from_joints<I>(joints: I) -> Option<Self>
    where
        I: IntoIterator<Item = (JointName, Joint)>,
    {
        let mut slots: [Option<Joint>; JointName::COUNT] = [None; JointName::COUNT];
        for (name, joint) in joints {
            let slot = &mut slots[name.index()];
            if slot.is_none() {
                *slot = Some(joint);
            }
        }

        let mut out = [Joint::new(0.0, 0.0, 0.0); JointName::COUNT];
        for (dst, src) in out.iter_mut().zip(slots) {
            *dst = src?;
        }
        Some(Self { joints: out })
    }

    pub fn joint(&self, name: JointName) -> &Joint {
        &self.joints[name.index()]
    }
}

// ============================================================================
// PER-FRAME MEASUREMENT
// ============================================================================

/// Biomechanical measurements for one analysed frame.
///
/// Distances are in source pixels. `None` knee bends mean the hip, knee or
/// ankle on that side was not tracked confidently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub time: f64,
    pub hip_y: f32,
    pub torso_len: f32,
    pub arm_ext: f32,
    pub shoulder_hip_ratio: f32,
    pub left_knee_bend: Option<f32>,
    pub right_knee_bend: Option<f32>,
}

// ============================================================================
// SKILLS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLabel {
    Serve,
    Spike,
    Set,
    General,
}

impl SkillLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serve => "serve",
            Self::Spike => "spike",
            Self::Set => "set",
            Self::General => "general",
        }
    }
}

impl fmt::Display for SkillLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serve" => Ok(Self::Serve),
            "spike" => Ok(Self::Spike),
            "set" => Ok(Self::Set),
            "general" => Ok(Self::General),
            other => anyhow::bail!("unknown skill '{}'", other),
        }
    }
}

/// Whether the skill comes from the classifier or is fixed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SkillMode {
    Auto,
    Manual(SkillLabel),
}

impl TryFrom<String> for SkillMode {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            Ok(Self::Manual(value.parse()?))
        }
    }
}

impl From<SkillMode> for String {
    fn from(mode: SkillMode) -> Self {
        match mode {
            SkillMode::Auto => "auto".to_string(),
            SkillMode::Manual(label) => label.as_str().to_string(),
        }
    }
}
