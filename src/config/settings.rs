//! TOML-based configuration for Kestrel.
//!
//! Example configuration:
//! ```toml
//! [detector]
//! history_period_days = 30
//! threshold_std = 2.5
//! threshold_relative = 1.25
//! threshold_absolute = 50.0
//!
//! aws_query_regions = ["us-east-1", "us-west-2", "eu-west-1"]
//! accounts = ["123456789012"]
//!
//! [queries.ec2_compute]
//! service = "AmazonEC2"
//! region = "all"
//!
//! [queries.s3_by_team]
//! service = "AmazonS3"
//! team = "media-*"
//!
//! [source]
//! path = "${BILLING_DB_PATH}"
//!
//! [sink]
//! path = "./data/anomalies.db"
//!
//! [run]
//! marker_dir = "./runs/markers"
//! archive_dir = "./runs/archive"
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::query::definition::QueryDefinition;
use crate::score::ScoreParams;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Detection window and thresholds.
    pub detector: DetectorSettings,

    /// Regions an `"all"` query expands over.
    #[serde(default)]
    pub aws_query_regions: Vec<String>,

    /// Usage account ids the fact source is restricted to (empty = all).
    #[serde(default)]
    pub accounts: Vec<String>,

    /// Declarative queries: name → dimension/predicate mapping.
    #[serde(default)]
    pub queries: BTreeMap<String, QueryDefinition>,

    /// Fact source location.
    pub source: StoreSettings,

    /// Result sink location.
    pub sink: StoreSettings,

    /// Run bookkeeping: markers and archives.
    #[serde(default)]
    pub run: RunSettings,
}

/// Detection thresholds. All four fields are required; a missing threshold
/// is a configuration error, not a default.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectorSettings {
    /// Trailing window length in days.
    pub history_period_days: u32,

    /// Standard-deviation multiplier the target day must clear.
    pub threshold_std: f64,

    /// Multiple of the baseline mean the target day must exceed.
    pub threshold_relative: f64,

    /// Absolute daily cost floor.
    pub threshold_absolute: f64,
}

/// Location of a SQLite store (supports `${ENV_VAR}` expansion).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreSettings {
    pub path: String,
}

impl StoreSettings {
    /// The path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<PathBuf, SettingsError> {
        Ok(PathBuf::from(expand_env_vars(&self.path)?))
    }
}

/// Marker and archive directories.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunSettings {
    /// Directory completion markers are written to.
    pub marker_dir: String,

    /// Directory per-run archive files are written to.
    pub archive_dir: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            marker_dir: "./runs/markers".to_string(),
            archive_dir: "./runs/archive".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `KESTREL_CONFIG`
    /// 2. `./kestrel.toml`
    /// 3. `~/.config/kestrel/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("KESTREL_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("kestrel.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("kestrel").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Err(SettingsError::FileNotFound(local_config))
    }

    /// Validate the configuration eagerly, before any I/O.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let detector = &self.detector;
        if detector.history_period_days < 2 {
            return Err(SettingsError::InvalidConfig(
                "history_period_days must be at least 2".to_string(),
            ));
        }
        for (name, value) in [
            ("threshold_std", detector.threshold_std),
            ("threshold_relative", detector.threshold_relative),
            ("threshold_absolute", detector.threshold_absolute),
        ] {
            if !value.is_finite() {
                return Err(SettingsError::InvalidConfig(format!(
                    "{} must be a finite number",
                    name
                )));
            }
        }

        let wants_all_regions = self
            .queries
            .values()
            .any(|query| query.normalized().get("region") == Some("all"));
        if wants_all_regions && self.aws_query_regions.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "a query uses region = \"all\" but aws_query_regions is empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Scoring parameters for one target date.
    pub fn score_params(&self, target: NaiveDate) -> ScoreParams {
        ScoreParams {
            target,
            lookback_days: self.detector.history_period_days,
            threshold_std: self.detector.threshold_std,
            threshold_relative: self.detector.threshold_relative,
            threshold_absolute: self.detector.threshold_absolute,
        }
    }
}

/// Expand `${VAR}` references in a string.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            SettingsError::InvalidConfig(format!("unclosed variable reference in {:?}", s))
        })?;
        let name = &after[..end];
        let value =
            env::var(name).map_err(|_| SettingsError::MissingEnvVar(name.to_string()))?;
        result.push_str(&value);
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    Ok(result)
}
