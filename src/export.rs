// src/export.rs
//
// Session exports. The CSV layout (frame columns, blank separator row,
// Summary rows, Tip rows) is consumed by existing spreadsheets and must
// keep its column order.

use crate::pipeline::session::SessionReport;
use anyhow::{Context, Result};
use chrono::Utc;
use csv::WriterBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_HEADER: [&str; 7] = [
    "time",
    "hipY",
    "torsoLen",
    "armExt",
    "shoulderHipRatio",
    "leftKneeBend",
    "rightKneeBend",
];

fn opt_cell(value: Option<f32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Renders the CSV export in memory.
pub fn render_csv(report: &SessionReport) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    {
        let mut wtr = WriterBuilder::new().flexible(true).from_writer(&mut out);
        wtr.write_record(CSV_HEADER)?;
        for frame in &report.frames {
            wtr.write_record([
                format!("{:.3}", frame.time),
                frame.hip_y.to_string(),
                frame.torso_len.to_string(),
                frame.arm_ext.to_string(),
                frame.shoulder_hip_ratio.to_string(),
                opt_cell(frame.left_knee_bend),
                opt_cell(frame.right_knee_bend),
            ])?;
        }
        wtr.flush()?;
    }

    // csv would quote an empty record; the separator must be a bare line
    out.push(b'\n');

    {
        let mut wtr = WriterBuilder::new().flexible(true).from_writer(&mut out);
        let summary = report.summary.as_ref();
        wtr.write_record(["Summary", "Skill (detected)", report.skill.as_str()])?;
        wtr.write_record([
            "Summary".to_string(),
            "Jump".to_string(),
            opt_cell(summary.map(|s| s.jump_relative)),
        ])?;
        wtr.write_record([
            "Summary".to_string(),
            "Arm".to_string(),
            opt_cell(summary.map(|s| s.arm_ext_relative)),
        ])?;
        wtr.write_record([
            "Summary".to_string(),
            "Shoulder/Hip".to_string(),
            opt_cell(summary.and_then(|s| s.shoulder_hip_median)),
        ])?;
        wtr.write_record([
            "Summary".to_string(),
            "Knee".to_string(),
            opt_cell(summary.and_then(|s| s.knee_median)),
        ])?;
        for tip in &report.tips {
            wtr.write_record(["Tip", *tip])?;
        }
        wtr.flush()?;
    }

    Ok(out)
}

pub fn write_csv(path: &Path, report: &SessionReport) -> Result<()> {
    let bytes = render_csv(report)?;
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 CSV export written to: {}", path.display());
    Ok(())
}

pub fn write_json_summary(path: &Path, source: &Path, report: &SessionReport) -> Result<()> {
    let value = serde_json::json!({
        "source": source.display().to_string(),
        "generated_at": Utc::now().to_rfc3339(),
        "frames": report.frames.len(),
        "report": report,
    });
    let json = serde_json::to_string_pretty(&value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 JSON summary written to: {}", path.display());
    Ok(())
}

/// `<output_dir>/<track stem><suffix>`
pub fn output_path(output_dir: &str, track: &Path, suffix: &str) -> PathBuf {
    let stem = track
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "session".to_string());
    Path::new(output_dir).join(format!("{}{}", stem, suffix))
}
