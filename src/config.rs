//! Client configuration.
//!
//! Configuration is loaded from `~/.aurora/config.json` and can be
//! overridden per-process with the `AURORA_BASE_URL`, `AURORA_API_KEY`,
//! and `AURORA_MODEL` environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

/// The configuration directory name.
const CONFIG_DIR: &str = ".aurora";

/// The configuration file name.
const CONFIG_FILE: &str = "config.json";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the chat completions API.
    pub base_url: String,
    /// Bearer token sent with requests, if any.
    pub api_key: Option<String>,
    /// Model requested for completions.
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    /// Apply environment overrides on top of the loaded values.
    ///
    /// Empty variables are ignored so `AURORA_API_KEY=` does not wipe a
    /// configured key.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = env::var("AURORA_BASE_URL") {
            if !value.is_empty() {
                self.base_url = value;
            }
        }
        if let Ok(value) = env::var("AURORA_API_KEY") {
            if !value.is_empty() {
                self.api_key = Some(value);
            }
        }
        if let Ok(value) = env::var("AURORA_MODEL") {
            if !value.is_empty() {
                self.model = value;
            }
        }
        self
    }
}

/// Manages configuration storage and retrieval.
#[derive(Debug)]
pub struct ConfigManager {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        let config_path = home.join(CONFIG_DIR).join(CONFIG_FILE);
        Some(Self { config_path })
    }

    /// Create a manager backed by an explicit path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Get the path to the configuration file.
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from the file.
    ///
    /// Returns defaults if the file doesn't exist or can't be read.
    pub fn load(&self) -> Config {
        if !self.config_path.exists() {
            return Config::default();
        }

        let file = match File::open(&self.config_path) {
            Ok(f) => f,
            Err(_) => return Config::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader(reader) {
            Ok(config) => config,
            Err(_) => Config::default(),
        }
    }

    /// Save configuration to the file.
    ///
    /// Creates the parent directory if it doesn't exist.
    /// Returns `true` if successful, `false` otherwise.
    pub fn save(&self, config: &Config) -> bool {
        if let Some(parent) = self.config_path.parent() {
            if !parent.exists() && fs::create_dir_all(parent).is_err() {
                return false;
            }
        }

        let file = match File::create(&self.config_path) {
            Ok(f) => f,
            Err(_) => return false,
        };

        let mut writer = BufWriter::new(file);
        if serde_json::to_writer_pretty(&mut writer, config).is_err() {
            return false;
        }

        writer.flush().is_ok()
    }
}
