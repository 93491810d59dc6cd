//! Application configuration.
//!
//! Settings layer in order: built-in defaults, then the optional TOML file
//! under the platform config directory, then `BIBLIO_*` environment
//! variables. Later layers win.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Directory name used under the platform config and data roots.
const APP_DIR: &str = "biblio";

/// Settings shared by the archive and any frontend.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Root directory where aggregate snapshots are stored.
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from the default config file location.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load configuration layering defaults, the TOML file at `path` when
    /// it exists, and the `BIBLIO_*` environment.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = Config::builder()
            .set_default("data_dir", default_data_dir().display().to_string())
            .context("failed to register configuration defaults")?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("BIBLIO"))
            .build()
            .context("failed to load configuration")?;
        settings
            .try_deserialize()
            .context("failed to parse configuration")
    }
}

/// Platform data directory for aggregate snapshots.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Platform path of the optional TOML config file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    let path = default_config_path();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let contents = format!(
        "# biblio configuration\n\n# Root directory for aggregate snapshots.\ndata_dir = \"{}\"\n",
        default_data_dir().display()
    );
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_locations_end_with_the_app_dir() {
        assert!(default_data_dir().ends_with(APP_DIR));
        assert!(default_config_path().ends_with("biblio/config.toml"));
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = AppConfig::load_from(dir.path().join("nonexistent.toml"))?;
        assert_eq!(config.data_dir, default_data_dir());
        Ok(())
    }

    #[test]
    fn load_from_reads_the_data_dir_from_toml() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "data_dir = \"/tmp/biblio-test-data\"\n")?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.data_dir, PathBuf::from("/tmp/biblio-test-data"));
        Ok(())
    }
}
