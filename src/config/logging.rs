//! `[logging]` section
//!
//! Read straight from the file: every key is optional and falls back to
//! the value in [`LoggingConfig::default`].

use serde::Deserialize;
use std::path::PathBuf;

/// How often the JSON log file starts over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl LogRotation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter level for cola's own targets; RUST_LOG replaces it entirely
    pub level: String,
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    /// File name stem, e.g. "cola" -> "cola.2024-01-15"
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_rotation: LogRotation::Daily,
            file_prefix: "cola".to_string(),
        }
    }
}
