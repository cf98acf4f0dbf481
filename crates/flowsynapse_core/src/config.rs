//! Core configuration.
//!
//! # Responsibility
//! - Parse host-provided JSON settings into a validated `CoreConfig`.
//! - Derive per-component settings (timer durations, log bootstrap input).
//!
//! # Invariants
//! - Every field has a default; an empty object is a valid config.
//! - A config returned by `from_json_str` has passed `validate`.

use crate::logging::normalize_level;
use crate::timer::focus::{FocusTimerConfig, DEFAULT_BANNER_DISMISS_SECS, DEFAULT_FOCUS_SECS};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CoreConfig {
    /// `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling logs; logging stays off when unset.
    pub log_dir: Option<String>,
    /// Absolute SQLite file path; in-memory storage when unset.
    pub database_path: Option<String>,
    pub focus_duration_secs: u32,
    pub banner_dismiss_secs: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            database_path: None,
            focus_duration_secs: DEFAULT_FOCUS_SECS,
            banner_dismiss_secs: DEFAULT_BANNER_DISMISS_SECS,
        }
    }
}

/// Configuration parse/validation failures.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidLogLevel(String),
    RelativePath { field: &'static str, value: String },
    ZeroDuration(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::RelativePath { field, value } => {
                write!(f, "`{field}` must be an absolute path, got `{value}`")
            }
            Self::ZeroDuration(field) => write!(f, "`{field}` must be greater than zero"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.log_level).map_err(ConfigError::InvalidLogLevel)?;
        require_absolute("logDir", self.log_dir.as_deref())?;
        require_absolute("databasePath", self.database_path.as_deref())?;
        if self.focus_duration_secs == 0 {
            return Err(ConfigError::ZeroDuration("focusDurationSecs"));
        }
        if self.banner_dismiss_secs == 0 {
            return Err(ConfigError::ZeroDuration("bannerDismissSecs"));
        }
        Ok(())
    }

    pub fn focus_timer(&self) -> FocusTimerConfig {
        FocusTimerConfig {
            duration_secs: self.focus_duration_secs,
            banner_dismiss_secs: self.banner_dismiss_secs,
        }
    }
}

fn require_absolute(field: &'static str, value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(path) if !Path::new(path.trim()).is_absolute() => Err(ConfigError::RelativePath {
            field,
            value: path.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};

    #[test]
    fn empty_object_yields_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.focus_timer().duration_secs, 1500);
    }

    #[test]
    fn rejects_unknown_level_and_relative_paths() {
        let err = CoreConfig::from_json_str(r#"{"logLevel":"loud"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));

        let err = CoreConfig::from_json_str(r#"{"databasePath":"notes.db"}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RelativePath {
                field: "databasePath",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_durations_and_unknown_fields() {
        let err = CoreConfig::from_json_str(r#"{"focusDurationSecs":0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDuration("focusDurationSecs")));

        let err = CoreConfig::from_json_str(r#"{"theme":"dark"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
