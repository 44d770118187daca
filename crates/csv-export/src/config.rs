//! Export configuration, loadable from TOML.
//!
//! ```toml
//! download_name = "patients"
//!
//! [format]
//! delimiter = ";"
//! enclosure = "\""
//! escape = "\\"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::download::DEFAULT_DOWNLOAD_NAME;
use crate::error::{ExportError, Result};
use crate::format::CsvFormat;

/// Settings applied to a [`TabularExporter`](crate::TabularExporter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Download name used when none is given.
    pub download_name: String,
    /// Dialect used for both rendering and reading.
    pub format: CsvFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            download_name: DEFAULT_DOWNLOAD_NAME.to_string(),
            format: CsvFormat::default(),
        }
    }
}

impl ExportConfig {
    /// Set the CSV dialect.
    #[must_use]
    pub fn with_format(mut self, format: CsvFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the default download name.
    #[must_use]
    pub fn with_download_name(mut self, name: impl Into<String>) -> Self {
        self.download_name = name.into();
        self
    }

    /// Parse a configuration from TOML text. Missing keys use defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExportError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ExportError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded export configuration");
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults when it is missing
    /// or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ExportError::FileNotFound { .. }) => {
                tracing::info!(path = %path.display(), "No export configuration found, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load export configuration, using defaults");
                Self::default()
            }
        }
    }
}
