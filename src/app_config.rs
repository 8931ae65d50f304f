//! Persistent calculator configuration.
//!
//! The configuration is a JSON file in the platform config directory. When
//! the file is missing it is created with the default values.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::calculator::DEFAULT_STORAGE_GB;
use crate::error::Result;
use crate::selection::AutoSelect;

pub const CONFIG_FILE: &str = "recording-calc.json";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// CSV or JSON catalog to load instead of the builtin one.
    pub catalog_path: Option<PathBuf>,
    /// Storage capacity used until the user picks another one.
    pub storage_gb: f64,
    /// Select the first option of dependent levels after each change.
    pub auto_select_first: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            storage_gb: DEFAULT_STORAGE_GB,
            auto_select_first: true,
        }
    }
}

impl AppConfig {
    /// Reads the configuration at `config_file_path`, creating it with the
    /// defaults if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, written, or parsed.
    pub async fn load_or_create(config_file_path: &Path) -> Result<Self> {
        if config_file_path.exists() {
            let content = tokio::fs::read_to_string(config_file_path).await?;
            let config: AppConfig = serde_json::from_str(&content)
                .map_err(|e| {
                    anyhow!("Invalid config {:?}: {}", config_file_path, e)
                })?;
            info!("Configuration loaded from {:?}", config_file_path);
            return Ok(config);
        }

        let config = AppConfig::default();
        if let Some(config_dir) = config_file_path.parent() {
            tokio::fs::create_dir_all(config_dir).await?;
        }
        tokio::fs::write(
            config_file_path,
            serde_json::to_string_pretty(&config)?,
        )
        .await?;
        info!("Default configuration written to {:?}", config_file_path);

        Ok(config)
    }

    /// Reads the configuration at `path`, or uses the defaults when the path
    /// is unknown or the file cannot be loaded.
    pub async fn load_or_default(path: Result<PathBuf>) -> Self {
        let loaded = match path {
            Ok(path) => AppConfig::load_or_create(&path).await,
            Err(e) => Err(e),
        };

        loaded.unwrap_or_else(|e| {
            warn!("Using default configuration: {}", e);
            AppConfig::default()
        })
    }

    /// Applies command line values on top of the file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting storage capacity is negative or not
    /// finite.
    pub fn apply_overrides(
        &mut self, catalog: Option<PathBuf>, storage_gb: Option<f64>,
        no_auto_select: bool,
    ) -> Result<()> {
        if let Some(catalog) = catalog {
            self.catalog_path = Some(catalog);
        }
        if let Some(storage_gb) = storage_gb {
            self.storage_gb = storage_gb;
        }
        if no_auto_select {
            self.auto_select_first = false;
        }

        if !self.storage_gb.is_finite() || self.storage_gb < 0.0 {
            return Err(anyhow!(
                "Storage must be zero or more GB, got {}",
                self.storage_gb
            ));
        }

        Ok(())
    }

    pub fn auto_select(&self) -> AutoSelect {
        if self.auto_select_first {
            AutoSelect::FirstChild
        } else {
            AutoSelect::None
        }
    }
}

/// Location of the configuration file in the platform config directory.
pub fn default_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "recording-calc", "recording-calc")
        .ok_or_else(|| anyhow!("Unable to determine the config directory"))?;
    Ok(proj_dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("recording-calc-{}-{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn test_creates_default_config() {
        init_logger();
        let dir = temp_dir("cfg-create");
        let path = dir.join(CONFIG_FILE);

        let config = AppConfig::load_or_create(&path).await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        let reloaded = AppConfig::load_or_create(&path).await.unwrap();
        assert_eq!(reloaded, config);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_partial_config_uses_defaults() {
        init_logger();
        let dir = temp_dir("cfg-partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, r#"{"storage_gb": 64, "auto_select_first": false}"#)
            .unwrap();

        let config = AppConfig::load_or_create(&path).await.unwrap();
        assert_eq!(config.storage_gb, 64.0);
        assert_eq!(config.catalog_path, None);
        assert_eq!(config.auto_select(), AutoSelect::None);

        std::fs::remove_dir_all(dir).unwrap();
    }

    fn file_config() -> AppConfig {
        AppConfig {
            catalog_path: Some(PathBuf::from("/srv/devices.csv")),
            storage_gb: 64.0,
            auto_select_first: true,
        }
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = file_config();
        config
            .apply_overrides(
                Some(PathBuf::from("/tmp/devices.json")),
                Some(512.0),
                true,
            )
            .unwrap();

        assert_eq!(config.catalog_path, Some(PathBuf::from("/tmp/devices.json")));
        assert_eq!(config.storage_gb, 512.0);
        assert!(!config.auto_select_first);
        assert_eq!(config.auto_select(), AutoSelect::None);
    }

    #[test]
    fn test_no_overrides_keep_file_values() {
        let mut config = file_config();
        config.apply_overrides(None, None, false).unwrap();
        assert_eq!(config, file_config());
    }

    #[test]
    fn test_no_auto_select_flag_absent_keeps_file_value() {
        let mut config =
            AppConfig { auto_select_first: false, ..AppConfig::default() };
        config.apply_overrides(None, None, false).unwrap();
        assert!(!config.auto_select_first);
    }

    #[test]
    fn test_overrides_reject_bad_storage() {
        let mut config = file_config();
        assert!(config.apply_overrides(None, Some(-1.0), false).is_err());

        let mut config = file_config();
        assert!(config
            .apply_overrides(None, Some(f64::INFINITY), false)
            .is_err());

        let mut config = AppConfig { storage_gb: f64::NAN, ..file_config() };
        assert!(config.apply_overrides(None, None, false).is_err());

        let mut config = AppConfig { storage_gb: -8.0, ..file_config() };
        assert!(config.apply_overrides(None, Some(0.0), false).is_ok());
        assert_eq!(config.storage_gb, 0.0);
    }

    #[tokio::test]
    async fn test_load_or_default_falls_back() {
        init_logger();
        let config =
            AppConfig::load_or_default(Err(anyhow!("no config dir"))).await;
        assert_eq!(config, AppConfig::default());

        let dir = temp_dir("cfg-fallback");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, "{ broken").unwrap();

        let config = AppConfig::load_or_default(Ok(path)).await;
        assert_eq!(config, AppConfig::default());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_load_or_default_reads_file() {
        init_logger();
        let dir = temp_dir("cfg-read");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, r#"{"storage_gb": 128}"#).unwrap();

        let config = AppConfig::load_or_default(Ok(path)).await;
        assert_eq!(config.storage_gb, 128.0);
        assert!(config.auto_select_first);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_invalid_config_is_error() {
        init_logger();
        let dir = temp_dir("cfg-invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, "not json").unwrap();

        assert!(AppConfig::load_or_create(&path).await.is_err());

        std::fs::remove_dir_all(dir).unwrap();
    }
}
