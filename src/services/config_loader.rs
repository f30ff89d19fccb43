use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::services::submission_processor::DEFAULT_PENALTY_PER_ERROR;

pub const DEFAULT_CONFIG_FILE: &str = "scoreboard.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// File logging is disabled unless a directory is given.
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_log_file_name")]
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            file_name: default_log_file_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SnapshotConfig {
    /// Where the final standings are written as JSON.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreboardConfig {
    #[serde(default = "default_penalty_per_error")]
    pub penalty_per_error: i64,
    /// Stop reading input once `END` is processed.
    #[serde(default = "default_stop_at_end")]
    pub stop_at_end: bool,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl Default for ScoreboardConfig {
    fn default() -> Self {
        Self {
            penalty_per_error: default_penalty_per_error(),
            stop_at_end: default_stop_at_end(),
            logging: LoggingConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

fn default_penalty_per_error() -> i64 {
    DEFAULT_PENALTY_PER_ERROR
}

fn default_stop_at_end() -> bool {
    false
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_file_name() -> String {
    "icpc-scoreboard.log".to_string()
}

/// The explicit path if given, else `scoreboard.toml` in the working directory when present.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    fallback.exists().then(|| fallback.to_path_buf())
}

pub fn load_scoreboard_config(path: Option<&Path>) -> Result<ScoreboardConfig> {
    let Some(config_path) = path else {
        return Ok(ScoreboardConfig::default());
    };

    let raw = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config at {}", config_path.display()))?;

    toml::from_str::<ScoreboardConfig>(&raw)
        .with_context(|| format!("Failed to parse config at {}", config_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ScoreboardConfig = toml::from_str("").unwrap();
        assert_eq!(config.penalty_per_error, 20);
        assert!(!config.stop_at_end);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.directory, None);
        assert_eq!(config.snapshot.path, None);
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.toml");
        fs::write(
            &path,
            "penalty_per_error = 10\nstop_at_end = true\n\n[logging]\nlevel = \"debug\"\ndirectory = \"logs\"\n\n[snapshot]\npath = \"final.json\"\n",
        )
        .unwrap();

        let config = load_scoreboard_config(Some(&path)).unwrap();
        assert_eq!(config.penalty_per_error, 10);
        assert!(config.stop_at_end);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.directory.as_deref(), Some("logs"));
        assert_eq!(config.logging.file_name, "icpc-scoreboard.log");
        assert_eq!(config.snapshot.path.as_deref(), Some("final.json"));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = load_scoreboard_config(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "penalty_per_error = \"lots\"").unwrap();
        let err = load_scoreboard_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn no_path_means_defaults() {
        let config = load_scoreboard_config(None).unwrap();
        assert_eq!(config.penalty_per_error, 20);
    }
}
