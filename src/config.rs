//! Settings for the feature-engineering stage.
//!
//! The defaults match the data the scoring models were trained on. Settings are
//! stored as pretty JSON, the same way the rest of the pipeline tooling
//! persists its specs.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Logging settings consumed by [`crate::logging::init`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Directory for daily rolling log files. Console only when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureConfig {
    /// Group assigned to society types missing from the lookup table.
    ///
    /// `None` leaves them null in `tipo_sociedade_agrupado`, which is what
    /// downstream models were trained on. Set to e.g. `"outros"` to harden.
    pub unmapped_society_group: Option<String>,
    pub logging: LoggingConfig,
}

impl FeatureConfig {
    /// Parse settings from a JSON string. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse feature config JSON")
    }

    /// Load settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read feature config: {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Serialize settings to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize feature config")
    }

    /// Save settings to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json).context("Failed to write feature config file")
    }
}
