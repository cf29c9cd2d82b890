//! Service configuration
//!
//! Settings come from a TOML file (default location under the platform
//! config dir) with environment-variable overrides on top, so a container
//! deployment can skip the file entirely.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Runtime settings for the service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the `.xlsx` workbook acting as the tabular store
    pub workbook: PathBuf,
    /// Name of the sheet holding the destination/column name mappings
    pub config_sheet: String,
    /// Listen address for the HTTP server
    pub listen: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workbook: PathBuf::from("sheethook.xlsx"),
            config_sheet: "kv_config".to_string(),
            listen: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Config {
    /// Load settings from `path`, or from the default location when no
    /// path is given. A missing file is not an error; defaults apply.
    /// `SHEETHOOK_WORKBOOK`, `SHEETHOOK_CONFIG_SHEET` and
    /// `SHEETHOOK_LISTEN` override whatever the file says.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };

        let mut config = match path {
            Some(ref p) if p.exists() => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file: {}", p.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {}", p.display()))?
            }
            _ => Config::default(),
        };

        if let Ok(workbook) = std::env::var("SHEETHOOK_WORKBOOK") {
            config.workbook = PathBuf::from(workbook);
        }
        if let Ok(sheet) = std::env::var("SHEETHOOK_CONFIG_SHEET") {
            config.config_sheet = sheet;
        }
        if let Ok(listen) = std::env::var("SHEETHOOK_LISTEN") {
            config.listen = listen;
        }

        Ok(config)
    }

    /// Default config file location: `<config dir>/sheethook/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sheethook").join("config.toml"))
    }
}
