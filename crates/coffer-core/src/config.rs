//! Configuration loading and typed config structures for the Coffer service.
//!
//! The service reads `coffer-config.yaml` from its working directory. Every
//! field has a default, so a missing file or a partial one is fine. The
//! interest and tax rates are not part of this file: they live in the rates
//! document so operators can change them while the service runs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Default location of the service configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "coffer-config.yaml";

/// Environment variable overriding `storage.ledger_path`.
pub const LEDGER_PATH_ENV: &str = "COFFER_LEDGER_PATH";

/// Environment variable overriding `storage.rates_path`.
pub const RATES_PATH_ENV: &str = "COFFER_RATES_PATH";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CofferConfig {
    /// Where the ledger and rates documents live.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Maintenance sweep timing.
    #[serde(default)]
    pub maintenance: MaintenanceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CofferConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for storage paths:
    /// - `COFFER_LEDGER_PATH` overrides `storage.ledger_path`
    /// - `COFFER_RATES_PATH` overrides `storage.rates_path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.storage.apply_env_overrides();
        Ok(config)
    }

    /// Like [`from_file`](Self::from_file), but a file that does not exist
    /// yields the defaults (with environment overrides applied).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Err(ConfigError::Io { source }) if source.kind() == ErrorKind::NotFound => {
                let mut config = Self::default();
                config.storage.apply_env_overrides();
                Ok(config)
            }
            other => other,
        }
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.storage.apply_env_overrides();
        Ok(config)
    }
}

/// Storage locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// JSON document holding every account.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    /// JSON document holding the interest and tax rates.
    #[serde(default = "default_rates_path")]
    pub rates_path: PathBuf,
}

impl StorageConfig {
    /// Override storage paths with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override storage paths from `lookup`, which maps a variable name to
    /// its value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(LEDGER_PATH_ENV) {
            self.ledger_path = PathBuf::from(val);
        }
        if let Some(val) = lookup(RATES_PATH_ENV) {
            self.rates_path = PathBuf::from(val);
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            rates_path: default_rates_path(),
        }
    }
}

/// Maintenance sweep timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MaintenanceConfig {
    /// Seconds between two runs of the same sweep.
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
}

impl MaintenanceConfig {
    /// The sweep period. Never shorter than one second.
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs.max(1))
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_ledger_path() -> PathBuf {
    PathBuf::from("data/users.json")
}

fn default_rates_path() -> PathBuf {
    PathBuf::from("config.json")
}

const fn default_period_secs() -> u64 {
    86_400
}

fn default_log_filter() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = CofferConfig::default();
        assert_eq!(config.storage.ledger_path, PathBuf::from("data/users.json"));
        assert_eq!(config.storage.rates_path, PathBuf::from("config.json"));
        assert_eq!(config.maintenance.period(), Duration::from_secs(86_400));
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
storage:
  ledger_path: /var/lib/coffer/users.json
  rates_path: /etc/coffer/rates.json
maintenance:
  period_secs: 3600
logging:
  filter: coffer_core=debug,info
";
        let mut config: CofferConfig = serde_yml::from_str(yaml).unwrap();
        config.storage.apply_overrides(|_| None);
        assert_eq!(
            config.storage.ledger_path,
            PathBuf::from("/var/lib/coffer/users.json")
        );
        assert_eq!(config.storage.rates_path, PathBuf::from("/etc/coffer/rates.json"));
        assert_eq!(config.maintenance.period_secs, 3600);
        assert_eq!(config.logging.filter, "coffer_core=debug,info");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: CofferConfig = serde_yml::from_str("maintenance:\n  period_secs: 60\n").unwrap();
        assert_eq!(config.maintenance.period_secs, 60);
        assert_eq!(config.storage, StorageConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn zero_period_is_clamped() {
        let maintenance = MaintenanceConfig { period_secs: 0 };
        assert_eq!(maintenance.period(), Duration::from_secs(1));
    }

    #[test]
    fn overrides_replace_storage_paths() {
        let mut storage = StorageConfig::default();
        storage.apply_overrides(|key| match key {
            LEDGER_PATH_ENV => Some("/tmp/ledger.json".to_owned()),
            _ => None,
        });
        assert_eq!(storage.ledger_path, PathBuf::from("/tmp/ledger.json"));
        assert_eq!(storage.rates_path, PathBuf::from("config.json"));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = CofferConfig::parse("storage: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("coffer-config-that-does-not-exist.yaml");
        let config = CofferConfig::load(&path).unwrap();
        assert_eq!(config.maintenance, MaintenanceConfig::default());
        assert!(matches!(
            CofferConfig::from_file(&path),
            Err(ConfigError::Io { .. })
        ));
    }
}
