//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use arena_types::ArenaParams;

use crate::NodeError;

/// Configuration for an arena node.
///
/// Can be loaded from a TOML file via [`ArenaConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Path of the store snapshot. Loaded at startup if present, written
    /// back at shutdown.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Platform parameters: rank ladder, expiry windows, conversion rates.
    #[serde(default)]
    pub params: ArenaParams,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to register Prometheus metrics.
    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    /// Entries returned by the leaderboard query.
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("./arena_data/arena.snapshot")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_leaderboard_size() -> usize {
    20
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ArenaConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ArenaConfig is always serializable to TOML")
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            params: ArenaParams::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: default_true(),
            leaderboard_size: default_leaderboard_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ArenaConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = ArenaConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.log_level, config.log_level);
        assert_eq!(parsed.params.duel_duration_secs, config.params.duel_duration_secs);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ArenaConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.log_format, "human");
        assert_eq!(config.leaderboard_size, 20);
        assert_eq!(config.params.tickets_per_euro, 10);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            log_level = "debug"

            [params]
            duel_duration_secs = 3600
        "#;
        let config = ArenaConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.params.duel_duration_secs, 3600);
        assert_eq!(config.log_format, "human"); // default
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = ArenaConfig::from_toml_file("/nonexistent/arena.toml");
        assert!(matches!(result.unwrap_err(), NodeError::Config(_)));
    }
}
