//! Config for usbwatch binary
//!
//! All fields are optional so a config only needs the values it changes; command line arguments override anything set here.
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};
use crate::watch::WatchSettings;

const CONF_DIR: &str = "usbwatch";
const CONF_NAME: &str = "usbwatch.json";

/// Watch and output options read from a .json file
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Minimum delay between polls in milliseconds
    pub interval_ms: Option<u64>,
    /// Cap on the retry delay in milliseconds
    pub max_backoff_ms: Option<u64>,
    /// Consecutive failed polls before exiting; unset retries forever
    pub max_failures: Option<u32>,
    /// Print newline delimited JSON events rather than text
    pub json: bool,
}

impl Config {
    /// Default new
    pub fn new() -> Config {
        Config {
            ..Default::default()
        }
    }

    /// Get example [`Config`]
    pub fn example() -> Config {
        Config {
            interval_ms: Some(500),
            max_backoff_ms: Some(10_000),
            max_failures: Some(20),
            json: false,
        }
    }

    /// Default config path: `$XDG_CONFIG_HOME/usbwatch/usbwatch.json` or platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONF_DIR).join(CONF_NAME))
    }

    /// Attempt to read from .json format config at `file_path`
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Config> {
        let f = File::open(file_path.as_ref()).map_err(|e| {
            Error::new(
                ErrorKind::Config,
                &format!("Failed to open {}: {}", file_path.as_ref().display(), e),
            )
        })?;
        let mut br = BufReader::new(f);
        let mut data = String::new();

        br.read_to_string(&mut data)?;
        serde_json::from_str::<Config>(&data).map_err(|e| {
            Error::new(
                ErrorKind::Config,
                &format!("Failed to parse {}: {}", file_path.as_ref().display(), e),
            )
        })
    }

    /// Load from the [`Config::default_path`] if it exists
    ///
    /// A broken default config is logged and replaced with the default rather than stopping the binary.
    pub fn from_default_path() -> Config {
        match Config::default_path() {
            Some(path) if path.exists() => Config::from_file(&path).unwrap_or_else(|e| {
                log::warn!("Ignoring default config {}: {:#}", path.display(), e);
                Config::new()
            }),
            _ => Config::new(),
        }
    }

    /// [`WatchSettings`] with any values set here applied over the defaults
    pub fn watch_settings(&self) -> WatchSettings {
        let defaults = WatchSettings::default();
        WatchSettings {
            interval: self
                .interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval),
            max_backoff: self
                .max_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_backoff),
            max_failures: self.max_failures.or(defaults.max_failures),
        }
    }
}
