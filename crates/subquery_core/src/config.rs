//! Session configuration.
//!
//! # Responsibility
//! - Turn raw user input (flags, environment) into a validated config.
//! - Reject bad input before any connection is opened.
//!
//! # Invariants
//! - A validated config always names known steps, a supported log level and,
//!   when set, an absolute log directory.

use crate::db::{open_dataset, open_sample_in_memory, DbResult};
use crate::logging::{default_log_level, normalize_level};
use crate::walkthrough::{Selection, UnknownStep};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Dataset file name used when none is given.
pub const DEFAULT_DATASET_PATH: &str = "data.sqlite";

/// Default level when logs share the terminal with walkthrough output.
///
/// Failures already reach stderr through the binary's `ERROR:` line.
pub const STDERR_LOG_LEVEL: &str = "off";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownStep(u32),
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStep(number) => write!(f, "unknown step {number}"),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::RelativeLogDir(dir) => {
                write!(f, "log dir must be an absolute path, got `{}`", dir.display())
            }
        }
    }
}

impl Error for ConfigError {}

impl From<UnknownStep> for ConfigError {
    fn from(value: UnknownStep) -> Self {
        Self::UnknownStep(value.0)
    }
}

/// Where the session reads the CRM tables from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    /// Bundled sample loaded into memory.
    Sample,
}

impl DatasetSource {
    /// Opens a verified connection for this source.
    pub fn open(&self) -> DbResult<Connection> {
        match self {
            Self::File(path) => open_dataset(path),
            Self::Sample => open_sample_in_memory(),
        }
    }
}

impl Default for DatasetSource {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_DATASET_PATH))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Unvalidated input as collected from flags and environment.
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
    pub dataset: Option<PathBuf>,
    pub use_sample: bool,
    pub steps: Vec<u32>,
    pub format: OutputFormat,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

/// Validated session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkthroughConfig {
    pub source: DatasetSource,
    pub selection: Selection,
    pub format: OutputFormat,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
}

impl RawConfig {
    /// Validates raw input.
    ///
    /// `use_sample` takes precedence over `dataset`.
    pub fn validate(self) -> Result<WalkthroughConfig, ConfigError> {
        let selection = Selection::from_numbers(self.steps)?;

        let log_level = match self.log_level.as_deref() {
            Some(level) => normalize_level(level).map_err(ConfigError::InvalidLogLevel)?,
            None if self.log_dir.is_some() => default_log_level(),
            None => STDERR_LOG_LEVEL,
        };

        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }

        let source = if self.use_sample {
            DatasetSource::Sample
        } else {
            self.dataset
                .map(DatasetSource::File)
                .unwrap_or_default()
        };

        Ok(WalkthroughConfig {
            source,
            selection,
            format: self.format,
            log_level,
            log_dir: self.log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DatasetSource, RawConfig, DEFAULT_DATASET_PATH, STDERR_LOG_LEVEL};
    use crate::walkthrough::Selection;
    use std::path::PathBuf;

    #[test]
    fn defaults_read_data_sqlite_and_run_every_step() {
        let config = RawConfig::default().validate().unwrap();
        assert_eq!(
            config.source,
            DatasetSource::File(PathBuf::from(DEFAULT_DATASET_PATH))
        );
        assert_eq!(config.selection, Selection::All);
        assert_eq!(config.log_level, STDERR_LOG_LEVEL);
    }

    #[test]
    fn file_logging_uses_build_mode_default_level() {
        let raw = RawConfig {
            log_dir: Some(std::env::temp_dir()),
            ..RawConfig::default()
        };
        assert_eq!(raw.validate().unwrap().log_level, crate::default_log_level());
    }

    #[test]
    fn sample_flag_wins_over_dataset_path() {
        let raw = RawConfig {
            dataset: Some(PathBuf::from("elsewhere.sqlite")),
            use_sample: true,
            ..RawConfig::default()
        };
        assert_eq!(raw.validate().unwrap().source, DatasetSource::Sample);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let unknown_step = RawConfig {
            steps: vec![9],
            ..RawConfig::default()
        };
        assert_eq!(
            unknown_step.validate().unwrap_err(),
            ConfigError::UnknownStep(9)
        );

        let bad_level = RawConfig {
            log_level: Some("loud".to_string()),
            ..RawConfig::default()
        };
        assert!(matches!(
            bad_level.validate().unwrap_err(),
            ConfigError::InvalidLogLevel(_)
        ));

        let relative_dir = RawConfig {
            log_dir: Some(PathBuf::from("logs")),
            ..RawConfig::default()
        };
        assert_eq!(
            relative_dir.validate().unwrap_err(),
            ConfigError::RelativeLogDir(PathBuf::from("logs"))
        );
    }
}
