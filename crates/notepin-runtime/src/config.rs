#![forbid(unsafe_code)]

//! Runtime configuration.
//!
//! Loaded from TOML at startup. Every field has a default, so an empty file
//! (or no file at all) gives the stock behavior.
//!
//! ```toml
//! # notepin.toml
//! data_file = "/home/me/notes_data.json"
//! autosave_interval_ms = 5000
//! history_depth = 20
//! long_press_ms = 300
//! log_filter = "notepin=debug"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::storage::default_data_path;
use crate::undo::{HistoryConfig, MAX_HISTORY_SIZE};

/// Tunables for a notepin session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Data file; `notes_data.json` beside the executable when unset.
    pub data_file: Option<PathBuf>,
    /// Period of the background save.
    pub autosave_interval_ms: u64,
    /// Undo history capacity.
    pub history_depth: usize,
    /// Hold time before a press on a drag handle starts a drag.
    pub long_press_ms: u64,
    /// `tracing` filter directive; `RUST_LOG` overrides it.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            autosave_interval_ms: 5_000,
            history_depth: MAX_HISTORY_SIZE,
            long_press_ms: 300,
            log_filter: "info".into(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Like [`from_toml_file`](Self::from_toml_file), but a missing file
    /// yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Problems with the values, one message each. Empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.autosave_interval_ms == 0 {
            errors.push("autosave_interval_ms must be > 0".into());
        }
        if self.history_depth == 0 {
            errors.push("history_depth must be > 0".into());
        }
        if self.log_filter.trim().is_empty() {
            errors.push("log_filter must not be empty".into());
        }
        if self
            .data_file
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            errors.push("data_file must not be empty when set".into());
        }
        errors
    }

    /// [`validate`](Self::validate) as a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(default_data_path)
    }

    #[must_use]
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }

    #[must_use]
    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    #[must_use]
    pub fn history(&self) -> HistoryConfig {
        HistoryConfig::new(self.history_depth)
    }
}

/// Failure loading a [`RuntimeConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.autosave_interval(), Duration::from_secs(5));
        assert_eq!(config.history().max_depth, 20);
        assert_eq!(config.long_press(), Duration::from_millis(300));
        assert_eq!(config.log_filter, "info");
        assert!(config.validate().is_empty());
        assert!(config.data_path().ends_with("notes_data.json"));
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            RuntimeConfig::from_toml_str("").unwrap(),
            RuntimeConfig::default()
        );
    }

    #[test]
    fn partial_toml_backfills() {
        let config = RuntimeConfig::from_toml_str(
            "history_depth = 5\ndata_file = \"/tmp/notes.json\"\n",
        )
        .unwrap();
        assert_eq!(config.history_depth, 5);
        assert_eq!(config.data_path(), PathBuf::from("/tmp/notes.json"));
        assert_eq!(config.autosave_interval_ms, 5_000);
    }

    #[test]
    fn validation_reports_each_problem() {
        let config = RuntimeConfig {
            autosave_interval_ms: 0,
            history_depth: 0,
            log_filter: "  ".into(),
            ..RuntimeConfig::default()
        };
        let errors = config.clone().validate();
        assert_eq!(errors.len(), 3);
        assert!(matches!(
            config.validated(),
            Err(ConfigError::Validation(list)) if list.len() == 3
        ));
    }

    #[test]
    fn bad_toml_is_typed() {
        let err = RuntimeConfig::from_toml_str("history_depth = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.to_string().starts_with("TOML parse error"));
    }

    #[test]
    fn missing_file_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert_eq!(
            RuntimeConfig::load_or_default(&path).unwrap(),
            RuntimeConfig::default()
        );
        assert!(matches!(
            RuntimeConfig::from_toml_file(&path),
            Err(ConfigError::Io(_))
        ));

        std::fs::write(&path, "long_press_ms = 450\n").unwrap();
        assert_eq!(RuntimeConfig::from_toml_file(&path).unwrap().long_press_ms, 450);
    }
}
