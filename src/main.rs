// src/main.rs

mod analysis;
mod config;
mod export;
mod pipeline;
mod pose_track;
mod types;

use anyhow::Result;
use pipeline::{LogSink, Session, SessionReport};
use pose_track::PoseTrackReader;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

struct TrackStats {
    frames_analyzed: usize,
    skill: String,
    jump_relative: Option<f32>,
    arm_ext_relative: Option<f32>,
    markers: usize,
    tips: usize,
    exported: bool,
    malformed_lines: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let (config, loaded) = types::Config::load_or_default(&config_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🏐 Volleyball Analyzer Starting");
    if loaded {
        info!("✓ Configuration loaded from {}", config_path);
    } else {
        warn!("⚠️  {} not found, using built-in defaults", config_path);
    }
    info!(
        "Sampling at {:.0} FPS | skill mode: {} | confidence > {:.2}",
        config.sampling.target_fps,
        String::from(config.session.skill_mode),
        config.analysis.confidence_threshold
    );

    let tracks = pose_track::find_pose_tracks(&config.io.input_dir)?;
    if tracks.is_empty() {
        error!("No pose tracks found in {}", config.io.input_dir);
        return Ok(());
    }

    for (idx, track) in tracks.iter().enumerate() {
        info!("\n========================================");
        info!(
            "Processing track {}/{}: {}",
            idx + 1,
            tracks.len(),
            track.display()
        );
        info!("========================================\n");

        match process_track(track, &config).await {
            Ok(stats) => {
                info!("\n✓ Track processed successfully!");
                info!("  Frames analysed: {}", stats.frames_analyzed);
                info!("  🏐 Skill: {}", stats.skill);
                if let (Some(jump), Some(reach)) = (stats.jump_relative, stats.arm_ext_relative) {
                    info!("  Jump (rel): {:.2} | Arm reach: {:.2}", jump, reach);
                }
                info!("  📍 Markers: {}", stats.markers);
                info!("  💡 Tips: {}", stats.tips);
                if stats.malformed_lines > 0 {
                    warn!("  ⚠️  Malformed lines skipped: {}", stats.malformed_lines);
                }
                if !stats.exported {
                    warn!("  Export skipped (not enough frames)");
                }
            }
            Err(e) => {
                error!("Failed to process track: {:#}", e);
            }
        }
    }

    Ok(())
}

async fn process_track(track: &Path, config: &types::Config) -> Result<TrackStats> {
    let mut reader = PoseTrackReader::open(track).await?;
    let mut session = Session::new(config);
    let mut sink = LogSink;

    let report = session.run(&mut reader, &mut sink).await?;

    let exported = session.can_export();
    if exported {
        export_report(track, config, &report)?;
    }

    Ok(TrackStats {
        frames_analyzed: session.frame_count(),
        skill: report.skill.to_string(),
        jump_relative: report.summary.map(|s| s.jump_relative),
        arm_ext_relative: report.summary.map(|s| s.arm_ext_relative),
        markers: report.markers.len(),
        tips: report.tips.len(),
        exported,
        malformed_lines: reader.malformed_lines(),
    })
}

fn export_report(track: &Path, config: &types::Config, report: &SessionReport) -> Result<()> {
    std::fs::create_dir_all(&config.io.output_dir)?;

    if config.io.save_csv {
        let path = export::output_path(&config.io.output_dir, track, "_analysis.csv");
        export::write_csv(&path, report)?;
    }
    if config.io.save_json_summary {
        let path = export::output_path(&config.io.output_dir, track, "_summary.json");
        export::write_json_summary(&path, track, report)?;
    }
    Ok(())
}
