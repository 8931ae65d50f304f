//! This module defines the device catalog tree used by the calculator:
//! `Device -> Format -> FrameRate -> Setting`. All types are serializable so a
//! catalog can be stored as JSON as well as CSV.

use serde::{Deserialize, Serialize};

/// Type alias for Device ID, a lowercase slug such as `sony-fx30`.
pub type DeviceId = String;

/// A recording quality setting, the leaf of the catalog tree.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Setting {
    pub name: String,
    pub bitrate_mbps: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

impl Setting {
    /// Label shown in option lists, e.g. `High (150 Mbps)`.
    pub fn label(&self) -> String {
        format!("{} ({} Mbps)", self.name, self.bitrate_mbps)
    }
}

/// A frame rate supported by a format, e.g. `59.94p`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct FrameRate {
    pub label: String,
    #[serde(default)]
    pub settings: Vec<Setting>,
}

/// A file format / codec container, e.g. `XAVC S 4K`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Format {
    pub name: String,
    #[serde(default)]
    pub frame_rates: Vec<FrameRate>,
}

/// A recording device with the formats it supports.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Device {
    #[serde(default)]
    pub id: DeviceId,
    pub brand: String,
    pub name: String,
    #[serde(default)]
    pub formats: Vec<Format>,
}

impl Device {
    /// Builds an empty device, deriving the id from brand and name.
    pub fn new(brand: &str, name: &str) -> Self {
        Self {
            id: device_id(brand, name),
            brand: brand.to_string(),
            name: name.to_string(),
            formats: Vec::new(),
        }
    }
}

/// The id derived for a device without an explicit one.
pub fn device_id(brand: &str, name: &str) -> DeviceId {
    slugify(&format!("{} {}", brand, name))
}

/// Lowercases the input and collapses every run of non alphanumeric
/// characters into a single `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Sony FX30"), "sony-fx30");
        assert_eq!(slugify("  Canon  EOS R5 "), "canon-eos-r5");
        assert_eq!(slugify("Apple iPhone 14 Pro!"), "apple-iphone-14-pro");
    }

    #[test]
    fn test_device_new_sets_id() {
        let device = Device::new("Sony", "FX30");
        assert_eq!(device.id, "sony-fx30");
        assert_eq!(device.name, "FX30");
        assert!(device.formats.is_empty());
    }

    #[test]
    fn test_setting_label() {
        let setting = Setting {
            name: "Standard".to_string(),
            bitrate_mbps: 100.0,
            resolution: None,
        };
        assert_eq!(setting.label(), "Standard (100 Mbps)");
    }

    #[test]
    fn test_setting_resolution_is_optional_in_json() {
        let setting: Setting =
            serde_json::from_str(r#"{"name":"HQ","bitrate_mbps":150.5}"#)
                .unwrap();
        assert_eq!(setting.resolution, None);
        assert_eq!(setting.label(), "HQ (150.5 Mbps)");
    }
}
