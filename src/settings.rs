use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::anomaly::DEFAULT_STD_DEV_MULTIPLIER;
use crate::error::{AuditError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default = "default_console_level")]
    pub console_level: String,
    #[serde(default = "default_file_level")]
    pub file_level: String,
    #[serde(default = "default_std_dev_multiplier")]
    pub std_dev_multiplier: f64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("report_log.txt")
}

fn default_console_level() -> String {
    "debug".to_string()
}

fn default_file_level() -> String {
    "info".to_string()
}

fn default_std_dev_multiplier() -> f64 {
    DEFAULT_STD_DEV_MULTIPLIER
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            log_file: default_log_file(),
            console_level: default_console_level(),
            file_level: default_file_level(),
            std_dev_multiplier: default_std_dev_multiplier(),
        }
    }
}

impl Settings {
    /// Apply command-line overrides on top of file or default values.
    pub fn with_overrides(mut self, output_dir: Option<PathBuf>, threshold: Option<f64>) -> Result<Self> {
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        if let Some(k) = threshold {
            self.std_dev_multiplier = k;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if !self.std_dev_multiplier.is_finite() || self.std_dev_multiplier < 0.0 {
            return Err(AuditError::Settings(format!(
                "std_dev_multiplier must be a non-negative number, got {}",
                self.std_dev_multiplier
            )));
        }
        Ok(())
    }
}

/// Settings from a JSON file, or defaults when no file is given. A file that
/// is named but unreadable is an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| AuditError::Settings(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&content).map_err(|e| AuditError::Settings(format!("{}: {e}", path.display())))
}
