//! Configuration for the cola command line
//!
//! Each setting resolves as: environment variable, then
//! `~/.config/cola/config.toml`, then the built-in default.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

mod logging;
mod serialization;


pub use logging::{LogRotation, LoggingConfig};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_SPEC_PATH: &str = "specs/cola.json";

pub const DEFAULT_SNAPSHOT_PATH: &str = "contract.json";

/// Environment overrides, by setting
const SPEC_ENV: &str = "COLA_SPEC";
const DOCUMENT_ENV: &str = "COLA_DOCUMENT";

#[derive(Debug, Clone)]
pub struct Config {
    /// Component specification (JSON) describing terminals and components
    pub spec_path: PathBuf,

    /// Working document the editing commands read and write
    pub snapshot_path: PathBuf,

    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spec_path: PathBuf::from(DEFAULT_SPEC_PATH),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            logging: LoggingConfig::default(),
        }
    }
}

/// What the config file may contain; absent keys stay `None`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub spec_path: Option<PathBuf>,
    pub snapshot_path: Option<PathBuf>,
    pub logging: Option<LoggingConfig>,
}

impl FileConfig {
    /// Parse `path`; a missing file is an empty config
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Cannot read config file {}", path.display()))
            }
        };
        toml::from_str(&contents).with_context(|| {
            format!(
                "Invalid config file {} (run `cola config --reset` to start over)",
                path.display()
            )
        })
    }
}

impl Config {
    /// ~/.config/cola/config.toml on every platform
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("cola").join("config.toml"))
    }

    /// Write the default config on first run so the options are discoverable
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path().filter(|p| !p.exists()) else {
            return;
        };
        let written = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::write(&path, Self::default().to_toml()));
        if let Err(e) = written {
            tracing::debug!("Skipped writing {}: {}", path.display(), e);
        }
    }

    /// Resolve against the process environment and the user's config file
    pub fn from_env() -> Result<Self> {
        let file = match Self::config_path() {
            Some(path) => FileConfig::load(&path)?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(file, |key| std::env::var(key).ok()))
    }

    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            spec_path: env(SPEC_ENV)
                .map(PathBuf::from)
                .or(file.spec_path)
                .unwrap_or(defaults.spec_path),
            snapshot_path: env(DOCUMENT_ENV)
                .map(PathBuf::from)
                .or(file.snapshot_path)
                .unwrap_or(defaults.snapshot_path),
            logging: file.logging.unwrap_or(defaults.logging),
        }
    }
}
