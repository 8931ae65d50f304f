//! Recording time and data size arithmetic.
//!
//! Storage sizes use binary units: 1 GB = 1024 MB, and bitrates are in
//! megabits per second (1 byte = 8 bits).

use anyhow::anyhow;
use serde::Serialize;

use crate::error::Result;

pub const DEFAULT_STORAGE_GB: f64 = 256.0;

const MB_PER_GB: f64 = 1024.0;
const BITS_PER_BYTE: f64 = 8.0;
const SECS_PER_MIN: f64 = 60.0;

/// A preset storage capacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorageOption {
    pub gb: f64,
    pub label: &'static str,
}

pub const STORAGE_OPTIONS: [StorageOption; 7] = [
    StorageOption { gb: 32.0, label: "32GB" },
    StorageOption { gb: 64.0, label: "64GB" },
    StorageOption { gb: 128.0, label: "128GB" },
    StorageOption { gb: 256.0, label: "256GB" },
    StorageOption { gb: 512.0, label: "512GB" },
    StorageOption { gb: 1024.0, label: "1TB" },
    StorageOption { gb: 2048.0, label: "2TB" },
];

/// The three outputs of the calculator for one setting and capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordingEstimate {
    pub bitrate_mbps: f64,
    pub storage_gb: f64,
    /// Whole minutes of footage that fit on the storage.
    pub max_minutes: u64,
    /// Data rate in megabytes per second.
    pub data_rate_mbps: f64,
    /// Size of one minute of footage in megabytes.
    pub per_minute_mb: f64,
}

impl RecordingEstimate {
    /// Computes the estimate for a bitrate in Mbps and a capacity in GB.
    ///
    /// # Errors
    ///
    /// Returns an error if the bitrate is not a positive number or the
    /// storage is negative or not finite.
    pub fn compute(bitrate_mbps: f64, storage_gb: f64) -> Result<Self> {
        if !bitrate_mbps.is_finite() || bitrate_mbps <= 0.0 {
            return Err(anyhow!("Bitrate must be positive, got {}", bitrate_mbps));
        }
        if !storage_gb.is_finite() || storage_gb < 0.0 {
            return Err(anyhow!(
                "Storage must be zero or more GB, got {}",
                storage_gb
            ));
        }

        let storage_megabits = storage_gb * MB_PER_GB * BITS_PER_BYTE;
        let max_minutes =
            (storage_megabits / (bitrate_mbps * SECS_PER_MIN)).floor() as u64;
        let data_rate_mbps = bitrate_mbps / BITS_PER_BYTE;
        let per_minute_mb = data_rate_mbps * SECS_PER_MIN;

        Ok(Self {
            bitrate_mbps,
            storage_gb,
            max_minutes,
            data_rate_mbps,
            per_minute_mb,
        })
    }

    /// Maximum duration rendered as hours and minutes.
    pub fn duration_label(&self) -> String {
        format_duration(self.max_minutes)
    }
}

/// Renders whole minutes as `Hh Mm`, e.g. 174 -> `2h 54m`.
pub fn format_duration(minutes: u64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Label for a capacity: the preset label when one matches, `<n>GB`
/// otherwise.
pub fn storage_label(gb: f64) -> String {
    STORAGE_OPTIONS
        .iter()
        .find(|option| option.gb == gb)
        .map(|option| option.label.to_string())
        .unwrap_or_else(|| format!("{}GB", gb))
}
