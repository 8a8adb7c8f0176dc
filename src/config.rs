use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise the built-in defaults.
    /// The flag tells the caller which one it got.
    pub fn load_or_default(path: &str) -> Result<(Self, bool)> {
        if Path::new(path).exists() {
            Ok((Self::load(path)?, true))
        } else {
            Ok((Self::default(), false))
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fps = self.sampling.target_fps;
        if !fps.is_finite() || fps <= 0.0 {
            anyhow::bail!("sampling.target_fps must be positive, got {}", fps);
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.analysis.confidence_threshold) {
            anyhow::bail!(
                "analysis.confidence_threshold must be within [0, 1], got {}",
                self.analysis.confidence_threshold
            );
        }
        if !unit.contains(&self.analysis.takeoff_jump_threshold) {
            anyhow::bail!(
                "analysis.takeoff_jump_threshold must be within [0, 1], got {}",
                self.analysis.takeoff_jump_threshold
            );
        }
        if self.session.max_pending_events == 0 {
            anyhow::bail!("session.max_pending_events must be at least 1");
        }
        Ok(())
    }

    /// Filter directive for `tracing_subscriber::EnvFilter`.
    pub fn log_filter(&self) -> String {
        format!("volleyball_analyzer={}", self.logging.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SkillLabel, SkillMode};
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let file = write_config("session:\n  skill_mode: serve\nsampling:\n  target_fps: 24\n");
        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.session.skill_mode, SkillMode::Manual(SkillLabel::Serve));
        assert_eq!(config.sampling.target_fps, 24.0);
        assert_eq!(config.session.min_frames_for_export, 6);
        assert!((config.analysis.confidence_threshold - 0.3).abs() < 1e-6);
        assert_eq!(config.io.output_dir, "output");
    }

    #[test]
    fn test_rejects_zero_fps() {
        let file = write_config("sampling:\n  target_fps: 0\n");
        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_rejects_unknown_skill_mode() {
        let file = write_config("session:\n  skill_mode: block\n");
        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let (config, loaded) = Config::load_or_default(path.to_str().unwrap()).unwrap();

        assert!(!loaded);
        assert_eq!(config.session.skill_mode, SkillMode::Auto);
        assert_eq!(config.log_filter(), "volleyball_analyzer=info");
    }
}
