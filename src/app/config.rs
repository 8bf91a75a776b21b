// Configuration loading for creature-notifier

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::settings::{parse_id_list, Schedule, Settings};
use crate::core::types::GeoPoint;

// =============================================================================
// CONFIGURATION STRUCTURES
// =============================================================================

/// An integer that may also be written as a numeric string (`"3"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i64),
    Text(String),
}

impl IntOrString {
    fn to_int(&self, field: &str) -> Result<i64, ConfigError> {
        match self {
            IntOrString::Int(n) => Ok(*n),
            IntOrString::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{field}: {s:?} is not a number"))),
        }
    }
}

/// Notification window as written in the file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Allowed weekdays, Monday = 0 .. Sunday = 6
    #[serde(default)]
    pub weekdays: Option<Vec<IntOrString>>,
    /// Allowed hours, 0 .. 23
    #[serde(default)]
    pub hours: Option<Vec<IntOrString>>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingSettings {
    /// Write logs to stderr
    #[serde(default)]
    pub console: bool,
    /// Log file path. Empty = no file logging.
    #[serde(default)]
    pub log_file: String,
}

impl LoggingSettings {
    /// The log file path, checked so that opening it later cannot fail on
    /// a missing directory or a path that names a directory.
    pub fn file_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        let raw = self.log_file.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let path = PathBuf::from(raw);
        if path.file_name().is_none() || path.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "logging.log_file: {raw} is not a file path"
            )));
        }
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if !dir.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "logging.log_file: directory {} does not exist",
                dir.display()
            )));
        }
        Ok(Some(path))
    }
}

/// Main configuration structure, as read from disk
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub slack_key: String,
    #[serde(default)]
    pub slack_channel: String,
    /// Comma-separated names or ids ignored while near
    #[serde(default)]
    pub notify_ignore: Option<String>,
    /// Comma-separated names or ids ignored while far
    #[serde(default)]
    pub notify_far_ignore: Option<String>,
    /// Far threshold in meters
    #[serde(default)]
    pub notify_distance: Option<IntOrString>,
    /// Notify far events even without `notify_far_ignore`
    #[serde(default)]
    pub notify_far_unlisted: bool,
    #[serde(default)]
    pub notify_schedule: Option<ScheduleConfig>,
    #[serde(default)]
    pub origin: Option<GeoPoint>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

// =============================================================================
// CONFIG LOADING
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to parse JSON config file: {0}")]
    ParseJsonError(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("No origin configured; set [origin] in the config file or pass --origin")]
    MissingOrigin,
}

impl Config {
    pub const CONFIG_FILENAME: &'static str = "creature_notifier.toml";

    /// Load configuration from `path`.
    ///
    /// Files ending in `.json` are read as JSON, everything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "[config] Loading config");

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&contents)?
        } else {
            Self::from_toml_str(&contents)?
        };

        info!(path = %path.display(), "[config] Loaded config");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Validate and normalise into the immutable `Settings`.
    ///
    /// `origin_override` (from the command line) wins over `[origin]`.
    pub fn into_settings(self, origin_override: Option<GeoPoint>) -> Result<Settings, ConfigError> {
        let origin = origin_override
            .or(self.origin)
            .ok_or(ConfigError::MissingOrigin)?;
        if !origin.is_valid() {
            return Err(ConfigError::Invalid(format!("origin {origin} is out of range")));
        }

        let distance_threshold_m = match &self.notify_distance {
            Some(raw) => {
                let meters = raw.to_int("notify_distance")?;
                if meters < 0 || meters > i64::from(u32::MAX) {
                    return Err(ConfigError::Invalid(format!(
                        "notify_distance: {meters} is out of range"
                    )));
                }
                // Zero disables the far/near split
                (meters > 0).then_some(meters as u32)
            }
            None => None,
        };

        self.logging.file_path()?;

        let schedule = match &self.notify_schedule {
            Some(raw) => parse_schedule(raw)?,
            None => None,
        };

        let settings = Settings {
            origin,
            slack_key: self.slack_key.trim().to_string(),
            slack_channel: self.slack_channel.trim().to_string(),
            ignore: self.notify_ignore.as_deref().and_then(parse_id_list),
            far_ignore: self.notify_far_ignore.as_deref().and_then(parse_id_list),
            distance_threshold_m,
            far_unlisted: self.notify_far_unlisted,
            schedule,
        };

        debug!(
            origin = %settings.origin,
            distance = ?settings.distance_threshold_m,
            ignore = settings.ignore.as_ref().map_or(0, HashSet::len),
            far_ignore = settings.far_ignore.as_ref().map_or(0, HashSet::len),
            schedule = settings.schedule.is_some(),
            "[config] Settings ready"
        );
        Ok(settings)
    }
}

/// An empty table disables the schedule; empty lists disable their half.
fn parse_schedule(raw: &ScheduleConfig) -> Result<Option<Schedule>, ConfigError> {
    let weekdays = parse_bounded_set(raw.weekdays.as_deref(), "notify_schedule.weekdays", 6)?;
    let hours = parse_bounded_set(raw.hours.as_deref(), "notify_schedule.hours", 23)?;

    if weekdays.is_none() && hours.is_none() {
        return Ok(None);
    }
    Ok(Some(Schedule { weekdays, hours }))
}

fn parse_bounded_set(
    values: Option<&[IntOrString]>,
    field: &str,
    max: u8,
) -> Result<Option<HashSet<u8>>, ConfigError> {
    let Some(values) = values else {
        return Ok(None);
    };

    let mut set = HashSet::new();
    for value in values {
        let n = value.to_int(field)?;
        if !(0..=i64::from(max)).contains(&n) {
            return Err(ConfigError::Invalid(format!(
                "{field}: {n} is outside 0..={max}"
            )));
        }
        set.insert(n as u8);
    }

    Ok((!set.is_empty()).then_some(set))
}
