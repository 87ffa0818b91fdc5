//! Persistent application settings.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Results file used when no location has been configured.
pub const DEFAULT_DATABASE_LOCATION: &str = "poling_results.csv";

/// Default settings file name.
pub const SETTINGS_FILE: &str = "polingscope_settings.json";

/// Settings stored as a small JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Where analysis results are saved.
    #[serde(rename = "Database location", default = "default_database_location")]
    pub database_location: PathBuf,
}

fn default_database_location() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_LOCATION)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_location: default_database_location(),
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file gives the defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but is not valid settings JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write settings to `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Builder: set the results file location.
    #[must_use]
    pub fn with_database_location<P: Into<PathBuf>>(mut self, location: P) -> Self {
        self.database_location = location.into();
        self
    }
}
