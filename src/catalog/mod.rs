//! This module defines the `Catalog` struct, the immutable device catalog the
//! calculator selects from. It includes lookup helpers for every level of the
//! `Device -> Format -> FrameRate -> Setting` tree, CSV export, and loading
//! from a `CatalogSource` with a fallback to the embedded catalog.

mod builtin;
mod csv_parser;
mod schemas;
mod source;

use std::collections::HashSet;

use anyhow::anyhow;
use log::{error, info};
use serde::{Deserialize, Serialize};

pub use csv_parser::{parse_csv, CSV_HEADER};
pub use schemas::{device_id, Device, DeviceId, Format, FrameRate, Setting};
pub use source::{
    catalog_source_for, BuiltinCatalog, CatalogSource, CsvCatalogFile,
    JsonCatalogFile,
};

use crate::error::Result;

/// A path through the catalog tree. Each level holds an index into the
/// children of the level above, or `None` when unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelectionPath {
    pub device: Option<usize>,
    pub format: Option<usize>,
    pub frame_rate: Option<usize>,
    pub setting: Option<usize>,
}

/// The device catalog. Loaded once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CatalogData")]
pub struct Catalog {
    devices: Vec<Device>,
}

//serialized form, devices may come without an id
#[derive(Deserialize)]
struct CatalogData {
    devices: Vec<Device>,
}

impl From<CatalogData> for Catalog {
    fn from(data: CatalogData) -> Self {
        let devices = data
            .devices
            .into_iter()
            .map(|device| {
                if device.id.is_empty() {
                    let id = device_id(&device.brand, &device.name);
                    Device { id, ..device }
                } else {
                    device
                }
            })
            .collect();
        Catalog { devices }
    }
}

fn check_csv_field(kind: &str, value: &str) -> Result<()> {
    if value.contains([',', '\n', '\r']) {
        return Err(anyhow!(
            "The {} {:?} contains a comma or line break",
            kind,
            value
        ));
    }
    Ok(())
}

impl Catalog {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    /// The catalog embedded in the binary.
    pub fn builtin() -> Self {
        builtin::builtin_catalog()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, device: usize) -> Option<&Device> {
        self.devices.get(device)
    }

    pub fn format(&self, device: usize, format: usize) -> Option<&Format> {
        self.device(device)?.formats.get(format)
    }

    pub fn frame_rate(
        &self, device: usize, format: usize, frame_rate: usize,
    ) -> Option<&FrameRate> {
        self.format(device, format)?.frame_rates.get(frame_rate)
    }

    /// Resolves a full selection path to its setting.
    ///
    /// Returns `None` when any segment of the path is unset or does not
    /// exist in the catalog.
    pub fn lookup(&self, path: &SelectionPath) -> Option<&Setting> {
        self.frame_rate(path.device?, path.format?, path.frame_rate?)?
            .settings
            .get(path.setting?)
    }

    /// Distinct brands in the order they first appear.
    pub fn brands(&self) -> Vec<&str> {
        let mut brands: Vec<&str> = Vec::new();
        for device in &self.devices {
            if !brands.contains(&device.brand.as_str()) {
                brands.push(&device.brand);
            }
        }
        brands
    }

    /// Devices of the given brand, compared case-insensitively, with their
    /// catalog indices.
    pub fn devices_by_brand(&self, brand: &str) -> Vec<(usize, &Device)> {
        self.devices
            .iter()
            .enumerate()
            .filter(|(_, device)| device.brand.eq_ignore_ascii_case(brand))
            .collect()
    }

    /// Finds a device index by id, display name, or `brand name`.
    pub fn find_device(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        self.devices.iter().position(|device| {
            device.id.eq_ignore_ascii_case(key)
                || device.name.eq_ignore_ascii_case(key)
                || format!("{} {}", device.brand, device.name)
                    .eq_ignore_ascii_case(key)
        })
    }

    /// Checks the catalog holds at least one device, unique non-empty
    /// device ids, only positive finite bitrates, and no `,` or line break
    /// in any text field, since the CSV export has no quoting.
    pub fn validate(&self) -> Result<()> {
        if self.devices.is_empty() {
            return Err(anyhow!("Catalog contains no devices"));
        }

        let mut ids: HashSet<&str> = HashSet::new();

        for device in &self.devices {
            if device.id.is_empty() {
                return Err(anyhow!("Device {:?} has an empty id", device.name));
            }
            if !ids.insert(device.id.as_str()) {
                return Err(anyhow!("Duplicate device id {:?}", device.id));
            }
            check_csv_field("brand", &device.brand)?;
            check_csv_field("device name", &device.name)?;

            for format in &device.formats {
                check_csv_field("format", &format.name)?;

                for frame_rate in &format.frame_rates {
                    check_csv_field("frame rate", &frame_rate.label)?;

                    for setting in &frame_rate.settings {
                        check_csv_field("setting", &setting.name)?;
                        if let Some(resolution) = &setting.resolution {
                            check_csv_field("resolution", resolution)?;
                        }

                        if !setting.bitrate_mbps.is_finite()
                            || setting.bitrate_mbps <= 0.0
                        {
                            return Err(anyhow!(
                                "Invalid bitrate {} for {} / {} / {} / {}",
                                setting.bitrate_mbps,
                                device.name,
                                format.name,
                                frame_rate.label,
                                setting.name
                            ));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Exports the catalog as CSV, one row per setting.
    ///
    /// A `resolution` column is appended only when some setting carries a
    /// resolution label. Devices, formats or frame rates without settings
    /// have no row to export.
    pub fn to_csv(&self) -> String {
        let with_resolution = self.settings().any(|(.., s)| s.resolution.is_some());

        let mut header = CSV_HEADER.to_string();
        if with_resolution {
            header.push_str(",resolution");
        }

        let mut lines = vec![header];
        for (device, format, frame_rate, setting) in self.settings() {
            let mut row = format!(
                "{},{},{},{},{},{}",
                device.brand,
                device.name,
                format.name,
                frame_rate.label,
                setting.name,
                setting.bitrate_mbps
            );
            if with_resolution {
                row.push(',');
                row.push_str(setting.resolution.as_deref().unwrap_or_default());
            }
            lines.push(row);
        }

        lines.join("\n")
    }

    fn settings(
        &self,
    ) -> impl Iterator<Item = (&Device, &Format, &FrameRate, &Setting)> {
        self.devices.iter().flat_map(|device| {
            device.formats.iter().flat_map(move |format| {
                format.frame_rates.iter().flat_map(move |frame_rate| {
                    frame_rate
                        .settings
                        .iter()
                        .map(move |setting| (device, format, frame_rate, setting))
                })
            })
        })
    }
}

/// Loads the catalog from `source`, falling back to the builtin catalog when
/// the source fails.
pub async fn load_or_builtin(source: &dyn CatalogSource) -> Catalog {
    match source.load().await {
        Ok(catalog) => {
            info!(
                "Loaded {} devices from {}",
                catalog.devices().len(),
                source.describe()
            );
            catalog
        }
        Err(e) => {
            error!(
                "Failed to load catalog from {}: {}. Using builtin catalog.",
                source.describe(),
                e
            );
            Catalog::builtin()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use source::MockCatalogSource;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn path(d: usize, f: usize, r: usize, s: usize) -> SelectionPath {
        SelectionPath {
            device: Some(d),
            format: Some(f),
            frame_rate: Some(r),
            setting: Some(s),
        }
    }

    #[test]
    fn test_builtin_is_valid() {
        let catalog = Catalog::builtin();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.devices().len(), 3);
    }

    #[test]
    fn test_lookup() {
        let catalog = Catalog::builtin();
        let setting = catalog.lookup(&path(0, 1, 0, 1)).unwrap();
        assert_eq!(setting.name, "High Quality");
        assert_eq!(setting.bitrate_mbps, 150.0);
    }

    #[test]
    fn test_lookup_fails_silently() {
        let catalog = Catalog::builtin();
        assert!(catalog.lookup(&SelectionPath::default()).is_none());
        assert!(catalog.lookup(&path(9, 0, 0, 0)).is_none());
        assert!(catalog.lookup(&path(0, 0, 0, 7)).is_none());

        let mut partial = path(0, 0, 0, 0);
        partial.frame_rate = None;
        assert!(catalog.lookup(&partial).is_none());
    }

    #[test]
    fn test_brands_and_devices_by_brand() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.brands(), vec!["Sony", "Canon", "Apple"]);

        let canon = catalog.devices_by_brand("canon");
        assert_eq!(canon.len(), 1);
        assert_eq!(canon[0].0, 1);
        assert_eq!(canon[0].1.name, "EOS R5");

        assert!(catalog.devices_by_brand("Nikon").is_empty());
    }

    #[test]
    fn test_find_device() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.find_device("sony-fx30"), Some(0));
        assert_eq!(catalog.find_device("iphone 14 pro"), Some(2));
        assert_eq!(catalog.find_device("Canon EOS R5"), Some(1));
        assert_eq!(catalog.find_device("GoPro"), None);
    }

    #[test]
    fn test_validate_rejects_empty_and_bad_bitrate() {
        assert!(Catalog::new(Vec::new()).validate().is_err());

        let mut catalog = Catalog::builtin();
        catalog.devices[0].formats[0].frame_rates[0].settings[0].bitrate_mbps =
            0.0;
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_csv_export_reimports() {
        init_logger();
        let catalog = Catalog::builtin();
        let csv = catalog.to_csv();
        assert!(csv.starts_with("brand,name,format,framerate,setting,bitrate,resolution\n"));
        assert!(csv.contains("\nSony,FX30,XAVC S-I 4K,24p,Standard,600,3840x2160"));

        assert_eq!(parse_csv(&csv).unwrap(), catalog);
    }

    #[test]
    fn test_validate_rejects_separators_in_names() {
        init_logger();
        let mut catalog = Catalog::builtin();
        catalog.devices[0].formats[0].frame_rates[0].settings[0].name =
            "200M 4:2:2, 10bit".to_string();
        assert!(catalog.validate().is_err());

        let mut catalog = Catalog::builtin();
        catalog.devices[1].formats[0].name = "Canon RAW\n8K".to_string();
        assert!(catalog.validate().is_err());

        let mut catalog = Catalog::builtin();
        catalog.devices[2].formats[0].frame_rates[0].settings[0].resolution =
            Some("3840,2160".to_string());
        assert!(catalog.validate().is_err());

        let mut catalog = Catalog::builtin();
        catalog.devices[2].brand = "Apple, Inc".to_string();
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_validated_catalog_exports_readable_csv() {
        init_logger();
        let mut catalog = Catalog::builtin();
        catalog.devices[0].formats[0].frame_rates[0].settings[0].name =
            "200M 4:2:2 10bit".to_string();
        assert!(catalog.validate().is_ok());
        assert_eq!(parse_csv(&catalog.to_csv()).unwrap(), catalog);
    }

    #[test]
    fn test_validate_rejects_bad_ids() {
        let catalog = Catalog::new(vec![
            Device::new("Sony", "FX 30"),
            Device::new("Sony FX", "30"),
        ]);
        assert_eq!(catalog.devices()[0].id, catalog.devices()[1].id);
        assert!(catalog.validate().is_err());

        let mut catalog = Catalog::builtin();
        catalog.devices[1].id = String::new();
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_json_without_ids_derives_them() {
        let json = r#"{"devices": [
            {"brand": "DJI", "name": "Pocket 3"},
            {"id": "gopro-12", "brand": "GoPro", "name": "Hero 12"}
        ]}"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.devices()[0].id, "dji-pocket-3");
        assert_eq!(catalog.devices()[1].id, "gopro-12");
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_csv_export_empty_catalog() {
        assert_eq!(Catalog::new(Vec::new()).to_csv(), CSV_HEADER);
    }

    #[tokio::test]
    async fn test_load_or_builtin_uses_source() {
        init_logger();
        let mut source = MockCatalogSource::new();
        source.expect_load().returning(|| {
            Ok(Catalog::new(vec![Device::new("DJI", "Pocket 3")]))
        });
        source.expect_describe().returning(|| "mock".to_string());

        let catalog = load_or_builtin(&source).await;
        assert_eq!(catalog.devices()[0].id, "dji-pocket-3");
    }

    #[tokio::test]
    async fn test_load_or_builtin_falls_back() {
        init_logger();
        let mut source = MockCatalogSource::new();
        source
            .expect_load()
            .returning(|| Err(anyhow!("cannot read catalog")));
        source.expect_describe().returning(|| "mock".to_string());

        let catalog = load_or_builtin(&source).await;
        assert_eq!(catalog, Catalog::builtin());
    }
}
