//! Configuration loading and config file resolution
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. `SHOWID_CONFIG` environment variable
//! 3. Per-user config file (`<config_dir>/showid/config.toml`)
//! 4. System config file (`/etc/showid/config.toml`, Linux only)
//!
//! When no file is found, built-in defaults are used. Every field of the
//! file is optional.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SHOWID_CONFIG";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Show identification tuning
    pub identify: IdentifyConfig,

    /// Track matching tuning
    pub matching: MatchingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Show identification settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IdentifyConfig {
    /// Upper bound on a single strategy invocation, in seconds
    pub strategy_timeout_secs: u64,

    /// Confidence added when two candidates agree and are merged (0-100)
    pub agreement_bonus: u8,

    /// Minimum language-model extraction confidence accepted (0.0-1.0)
    pub llm_min_confidence: f64,

    /// Top candidate is selected without prompting at or above this confidence
    pub auto_accept_threshold: Option<u8>,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            strategy_timeout_secs: 30,
            agreement_bonus: 15,
            llm_min_confidence: 0.6,
            auto_accept_threshold: None,
        }
    }
}

/// Track matching settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchingConfig {
    /// Fold encore (set 3) songs into set 2 before matching
    pub encore_in_set2: bool,

    /// Minimum title similarity for a fuzzy step to be accepted (0.0-1.0)
    pub fuzzy_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            encore_in_set2: false,
            fuzzy_threshold: 0.5,
        }
    }
}

impl TomlConfig {
    /// Reject values outside their meaningful ranges
    pub fn validate(&self) -> Result<()> {
        if self.identify.strategy_timeout_secs == 0 {
            return Err(Error::Config(
                "identify.strategy_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.identify.agreement_bonus > 100 {
            return Err(Error::Config(format!(
                "identify.agreement_bonus must be 0-100, got {}",
                self.identify.agreement_bonus
            )));
        }
        if !(0.0..=1.0).contains(&self.identify.llm_min_confidence) {
            return Err(Error::Config(format!(
                "identify.llm_min_confidence must be 0.0-1.0, got {}",
                self.identify.llm_min_confidence
            )));
        }
        if let Some(threshold) = self.identify.auto_accept_threshold {
            if threshold > 100 {
                return Err(Error::Config(format!(
                    "identify.auto_accept_threshold must be 0-100, got {}",
                    threshold
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.matching.fuzzy_threshold) {
            return Err(Error::Config(format!(
                "matching.fuzzy_threshold must be 0.0-1.0, got {}",
                self.matching.fuzzy_threshold
            )));
        }
        Ok(())
    }
}

/// Resolve which config file to read, if any
///
/// Returns `None` when neither an explicit path nor a default file exists.
/// An explicit path (CLI or environment) is returned even if missing so the
/// caller reports it instead of silently falling back to defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3 and 4: per-user, then system config file
    default_config_locations()
        .into_iter()
        .find(|candidate| candidate.exists())
}

/// Platform config file locations, most specific first
fn default_config_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("showid").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        locations.push(PathBuf::from("/etc/showid/config.toml"));
    }
    locations
}

/// Parse and validate a config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(format!("Config file not found: {}", path.display()))
        } else {
            Error::Io(e)
        }
    })?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    config.validate()?;

    debug!(path = %path.display(), "Loaded TOML config");
    Ok(config)
}

/// Resolve and load configuration, falling back to built-in defaults
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => {
            let config = load_toml_config(&path)?;
            info!("Configuration loaded from {}", path.display());
            Ok(config)
        }
        None => {
            info!("No config file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}
