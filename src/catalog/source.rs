//! Catalog sources: where the device catalog is read from.
//!
//! A source is anything implementing `CatalogSource`. The calculator ships
//! with CSV and JSON file sources plus the embedded catalog.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::info;

use super::csv_parser::parse_csv;
use super::Catalog;
use crate::error::Result;

#[cfg(test)]
use mockall::automock;

/// A trait defining how a device catalog is obtained.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Loads the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or parsed.
    async fn load(&self) -> Result<Catalog>;

    /// A short human readable description, used in logs.
    fn describe(&self) -> String;
}

/// Reads a catalog from a CSV file.
pub struct CsvCatalogFile {
    path: PathBuf,
}

impl CsvCatalogFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

#[async_trait]
impl CatalogSource for CsvCatalogFile {
    async fn load(&self) -> Result<Catalog> {
        info!("Reading CSV catalog from {:?}", self.path);
        let text = tokio::fs::read_to_string(&self.path).await?;
        parse_csv(&text)
    }

    fn describe(&self) -> String {
        format!("CSV file {}", self.path.display())
    }
}

/// Reads a catalog serialized as JSON.
pub struct JsonCatalogFile {
    path: PathBuf,
}

impl JsonCatalogFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

#[async_trait]
impl CatalogSource for JsonCatalogFile {
    async fn load(&self) -> Result<Catalog> {
        info!("Reading JSON catalog from {:?}", self.path);
        let text = tokio::fs::read_to_string(&self.path).await?;
        let catalog: Catalog = serde_json::from_str(&text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn describe(&self) -> String {
        format!("JSON file {}", self.path.display())
    }
}

/// The catalog compiled into the binary.
pub struct BuiltinCatalog;

#[async_trait]
impl CatalogSource for BuiltinCatalog {
    async fn load(&self) -> Result<Catalog> {
        Ok(Catalog::builtin())
    }

    fn describe(&self) -> String {
        "builtin catalog".to_string()
    }
}

/// Picks a source for the given path: `.json` files are read as JSON,
/// anything else as CSV. Without a path the builtin catalog is used.
pub fn catalog_source_for(path: Option<&Path>) -> Box<dyn CatalogSource> {
    match path {
        Some(path)
            if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json")) =>
        {
            Box::new(JsonCatalogFile::new(path))
        }
        Some(path) => Box::new(CsvCatalogFile::new(path)),
        None => Box::new(BuiltinCatalog),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("recording-calc-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_csv_file_source() {
        init_logger();
        let path = temp_file(
            "source.csv",
            "brand,name,format,framerate,setting,bitrate\nDJI,Pocket 3,H.265 4K,60p,High,130\n",
        );

        let catalog = CsvCatalogFile::new(&path).load().await.unwrap();
        assert_eq!(catalog.devices()[0].id, "dji-pocket-3");

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_json_file_source() {
        init_logger();
        let json = serde_json::to_string(&Catalog::builtin()).unwrap();
        let path = temp_file("source.json", &json);

        let source = catalog_source_for(Some(&path));
        let catalog = source.load().await.unwrap();
        assert_eq!(catalog, Catalog::builtin());

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        init_logger();
        let source = CsvCatalogFile::new("/nonexistent/recording-calc.csv");
        assert!(source.load().await.is_err());
    }

    #[test]
    fn test_catalog_source_for() {
        assert_eq!(catalog_source_for(None).describe(), "builtin catalog");
        assert_eq!(
            catalog_source_for(Some(Path::new("/tmp/devices.JSON"))).describe(),
            "JSON file /tmp/devices.JSON"
        );
        assert_eq!(
            catalog_source_for(Some(Path::new("/tmp/devices.csv"))).describe(),
            "CSV file /tmp/devices.csv"
        );
    }
}
