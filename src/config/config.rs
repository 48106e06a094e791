//! Settings file handling
//!
//! Settings are read from a TOML file. Every key is optional and falls back
//! to the appliance defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::errors::{AliasToolError, Result};

/// aliastool settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Appliance XML configuration document
    pub config_xml: PathBuf,
    /// Advisory lock file guarding the configuration document
    pub lock_file: PathBuf,
    /// Directory holding `<subsystem>.dirty` markers
    pub dirty_dir: PathBuf,
    /// Program and arguments that reload the firewall rules
    pub reload_command: Vec<String>,
    /// Alias names to protect in addition to the built-in reserved tables
    pub reserved_names: Vec<String>,
    /// Where to keep copies of the document taken before each write
    pub backup_dir: Option<PathBuf>,
    /// Backups to keep; 0 disables backups
    pub backup_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_xml: PathBuf::from("/cf/conf/config.xml"),
            lock_file: PathBuf::from("/tmp/config.lock"),
            dirty_dir: PathBuf::from("/var/run"),
            reload_command: vec![
                "/usr/local/sbin/pfSctl".to_string(),
                "-c".to_string(),
                "filter reload".to_string(),
            ],
            reserved_names: Vec::new(),
            backup_dir: Some(PathBuf::from("/cf/conf/backup")),
            backup_count: 30,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location when `None`
    ///
    /// An explicit path must exist. A missing default file yields the
    /// built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (file, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !file.exists() {
            if explicit {
                return Err(AliasToolError::Settings(format!(
                    "Settings file not found: {}",
                    file.display()
                )));
            }
            debug!(path = %file.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&file)
            .map_err(|e| AliasToolError::Settings(format!("Failed to read {}: {}", file.display(), e)))?;
        let settings = Self::from_toml(&content)?;
        debug!(path = %file.display(), "Settings loaded");
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        if settings.reload_command.is_empty() {
            return Err(AliasToolError::Settings("reload_command must not be empty".into()));
        }
        Ok(settings)
    }

    /// `<config dir>/aliastool/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("aliastool"))
            .unwrap_or_else(|| PathBuf::from(".aliastool"))
            .join("config.toml")
    }
}
