// src/pose_track.rs
//
// Pose source backed by a JSON Lines "pose track": one line per video
// instant, as written by a MoveNet-style keypoint exporter.
//
//   {"time": 0.083, "poses": [{"keypoints": [{"name": "left_hip", "x": .., "y": .., "score": ..}, ...]}]}

use crate::types::{Joint, JointName, Pose};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::{info, warn};
use walkdir::WalkDir;

/// One video instant. `pose` is `None` when no body was detected.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    pub time: f64,
    pub pose: Option<Pose>,
}

/// Asynchronous producer of sampled instants. `Ok(None)` ends the source.
#[allow(async_fn_in_trait)]
pub trait PoseSource {
    async fn next_frame(&mut self) -> Result<Option<SourceFrame>>;
}

#[derive(Debug, Deserialize)]
struct TrackLine {
    time: f64,
    #[serde(default)]
    poses: Vec<RawPose>,
}

#[derive(Debug, Deserialize)]
struct RawPose {
    keypoints: Vec<RawKeypoint>,
}

#[derive(Debug, Deserialize)]
struct RawKeypoint {
    name: String,
    x: f32,
    y: f32,
    #[serde(default)]
    score: f32,
}

impl RawPose {
    /// Keeps the twelve analysed joints; face keypoints are dropped.
    fn into_pose(self) -> Option<Pose> {
        Pose::from_joints(self.keypoints.into_iter().filter_map(|kp| {
            JointName::from_name(&kp.name).map(|name| (name, Joint::new(kp.x, kp.y, kp.score)))
        }))
    }
}

/// Parses one track line. Only the first pose is used.
pub fn parse_track_line(line: &str) -> Result<SourceFrame> {
    let parsed: TrackLine = serde_json::from_str(line)?;
    let pose = parsed
        .poses
        .into_iter()
        .next()
        .and_then(RawPose::into_pose);
    Ok(SourceFrame {
        time: parsed.time,
        pose,
    })
}

pub struct PoseTrackReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: u64,
    malformed_lines: u64,
}

impl PoseTrackReader {
    pub async fn open(path: &Path) -> Result<Self> {
        info!("Opening pose track: {}", path.display());
        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open pose track {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
            malformed_lines: 0,
        })
    }

    pub fn malformed_lines(&self) -> u64 {
        self.malformed_lines
    }
}

impl PoseSource for PoseTrackReader {
    async fn next_frame(&mut self) -> Result<Option<SourceFrame>> {
        while let Some(line) = self
            .lines
            .next_line()
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?
        {
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            match parse_track_line(&line) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    self.malformed_lines += 1;
                    warn!(
                        "⚠️  {}:{}: skipping malformed line: {}",
                        self.path.display(),
                        self.line_no,
                        e
                    );
                }
            }
        }
        Ok(None)
    }
}

/// All `.jsonl` pose tracks under `input_dir`, sorted by path.
pub fn find_pose_tracks(input_dir: &str) -> Result<Vec<PathBuf>> {
    let mut tracks = Vec::new();

    for entry in WalkDir::new(input_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        let is_track = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));
        if is_track {
            tracks.push(path.to_path_buf());
        }
    }

    tracks.sort();
    info!("Found {} pose track(s)", tracks.len());
    Ok(tracks)
}
