//! Runtime configuration shared by modules and environments

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {error}")]
    Read { path: String, error: String },

    #[error("Invalid config {path}: {error}")]
    Parse { path: String, error: String },

    #[error("Unsupported config format: {path} (expected .json, .yaml or .yml)")]
    UnsupportedFormat { path: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stream child process output to the console instead of discarding it
    pub debug: bool,
    /// Interpreter used for shell-mode commands and backticks
    pub shell: String,
    /// Seconds before a launched command is killed
    pub command_timeout: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            shell: "sh".to_string(),
            command_timeout: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: display.clone(),
            error: e.to_string(),
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: display,
                error: e.to_string(),
            }),
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: display,
                    error: e.to_string(),
                })
            }
            _ => Err(ConfigError::UnsupportedFormat { path: display }),
        }
    }

    /// Apply command-line flags on top of file values. Absent flags keep what
    /// the file (or the default) set.
    pub fn with_overrides(
        mut self,
        debug: bool,
        shell: Option<String>,
        timeout: Option<u64>,
    ) -> Self {
        if debug {
            self.debug = true;
        }
        if let Some(shell) = shell {
            self.shell = shell;
        }
        if timeout.is_some() {
            self.command_timeout = timeout;
        }
        self
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout.map(Duration::from_secs)
    }
}
