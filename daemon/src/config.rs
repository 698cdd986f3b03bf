//! Daemon configuration with TOML file support.

use holo_types::GovernanceParams;
use holo_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DaemonError;

/// Configuration for the daemon.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; CLI flags and
/// `HOLO_*` environment variables override individual fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Account that holds escrowed stakes and retained fees.
    #[serde(default = "default_escrow_account")]
    pub escrow_account: String,

    /// Bound of the sequencer's command queue.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Engine parameters, fixed for the lifetime of the engine.
    #[serde(default)]
    pub params: GovernanceParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_escrow_account() -> String {
    "holo-escrow".to_string()
}

fn default_channel_capacity() -> usize {
    64
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, DaemonError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DaemonError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, DaemonError> {
        toml::from_str(s).map_err(|e| DaemonError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, DaemonError> {
        toml::to_string_pretty(self).map_err(|e| DaemonError::Config(e.to_string()))
    }

    /// Check the values the engine does not validate itself.
    pub fn validate(&self) -> Result<(), DaemonError> {
        self.params
            .validate()
            .map_err(|e| DaemonError::Config(e.to_string()))?;
        if self.channel_capacity == 0 {
            return Err(DaemonError::Config(
                "channel_capacity must be at least 1".into(),
            ));
        }
        if self.escrow_account.is_empty() {
            return Err(DaemonError::Config("escrow_account must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            escrow_account: default_escrow_account(),
            channel_capacity: default_channel_capacity(),
            params: GovernanceParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = DaemonConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = DaemonConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.params, GovernanceParams::default());
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.escrow_account, "holo-escrow");
        assert_eq!(config.channel_capacity, 64);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            log_format = "json"
            channel_capacity = 8

            [params]
            support_pct = 60
            compensation_fee_pct = 5
        "#;
        let config = DaemonConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.channel_capacity, 8);
        assert_eq!(config.params.support_pct, 60);
        assert_eq!(config.params.compensation_fee_pct, 5);
        assert_eq!(config.params.queue_period_secs, 60); // default
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "escrow_account = \"vault\"").unwrap();
        let config = DaemonConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.escrow_account, "vault");
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = DaemonConfig::from_toml_file(Path::new("/nonexistent/holo.toml"));
        assert!(matches!(result, Err(DaemonError::Config(_))));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = DaemonConfig::default();
        assert!(config.validate().is_ok());

        config.channel_capacity = 0;
        assert!(matches!(config.validate(), Err(DaemonError::Config(_))));

        config.channel_capacity = 1;
        config.params.support_pct = 101;
        assert!(matches!(config.validate(), Err(DaemonError::Config(_))));
    }
}
