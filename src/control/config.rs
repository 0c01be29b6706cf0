//! Configuration loading for the headless runner.

use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Log level names accepted in `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

/// Settings for running a scene without a display.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RunnerConfig {
    /// Level applied to this crate's log output.
    pub log_level: LogLevel,
    /// Wall-clock pause between ticks. 0 runs as fast as possible.
    pub frame_interval_ms: u64,
    /// Where the JSON run report is written. No report when unset.
    pub report_path: Option<PathBuf>,
    /// Log a status line every this many ticks. 0 disables it.
    pub status_interval: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            frame_interval_ms: 16,
            report_path: None,
            status_interval: 60,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(RunnerConfig)` if the file was successfully loaded and parsed
    /// * `Err(String)` with a descriptive error message otherwise
    pub fn load(config_path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(config_path).map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load the config next to the scene, falling back to defaults when there is none.
    pub fn load_or_default(config_path: &Path) -> Result<Self, String> {
        if config_path.exists() { Self::load(config_path) } else { Ok(Self::default()) }
    }

    /// Derive the config path from a scene file path.
    ///
    /// Replaces the scene filename with "config.toml" in the same directory.
    pub fn config_path_from_scene(scene_path: &str) -> PathBuf {
        let scene = Path::new(scene_path);
        scene.parent().unwrap_or(Path::new(".")).join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kebab_case_keys() {
        let config: RunnerConfig = toml::from_str(
            r#"
            log-level = "debug"
            frame-interval-ms = 0
            report-path = "out/report.json"
            status-interval = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.log_level.to_filter(), LevelFilter::Debug);
        assert_eq!(config.frame_interval_ms, 0);
        assert_eq!(config.report_path, Some(PathBuf::from("out/report.json")));
        assert_eq!(config.status_interval, 10);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: RunnerConfig = toml::from_str("status-interval = 5").unwrap();
        assert_eq!(config.status_interval, 5);
        assert_eq!(config.frame_interval_ms, 16);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.report_path.is_none());
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert!(toml::from_str::<RunnerConfig>(r#"log-level = "loud""#).is_err());
    }

    #[test]
    fn config_sits_next_to_scene() {
        assert_eq!(RunnerConfig::config_path_from_scene("scenes/demo.json"), PathBuf::from("scenes/config.toml"));
        assert_eq!(RunnerConfig::config_path_from_scene("demo.json"), PathBuf::from("config.toml"));
    }

    #[test]
    fn absent_file_yields_defaults() {
        let config = RunnerConfig::load_or_default(Path::new("/nonexistent/dir/config.toml")).unwrap();
        assert_eq!(config, RunnerConfig::default());
    }
}
