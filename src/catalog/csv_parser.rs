//! This module turns the flat catalog CSV into the nested catalog tree.
//!
//! The expected columns are `brand,name,format,framerate,setting,bitrate`
//! with an optional trailing `resolution`. The first line is always treated
//! as the header. Rows are grouped by device, format and frame rate in the
//! order they first appear.

use std::str::FromStr;

use anyhow::anyhow;
use log::{info, warn};

use super::schemas::{Device, Format, FrameRate, Setting};
use super::Catalog;
use crate::error::Result;

pub const CSV_HEADER: &str = "brand,name,format,framerate,setting,bitrate";

const MIN_COLUMNS: usize = 6;

const COLUMNS: [&str; 5] = ["brand", "name", "format", "framerate", "setting"];

/// One parsed line of the catalog CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub brand: String,
    pub name: String,
    pub format: String,
    pub frame_rate: String,
    pub setting: String,
    pub bitrate_mbps: f64,
    pub resolution: Option<String>,
}

impl FromStr for CsvRow {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        if fields.len() < MIN_COLUMNS {
            return Err(anyhow!(
                "Expected at least {} columns, found {}",
                MIN_COLUMNS,
                fields.len()
            ));
        }

        for (column, value) in COLUMNS.iter().zip(&fields[..5]) {
            if value.is_empty() {
                return Err(anyhow!("Empty {} column", column));
            }
        }

        let bitrate_mbps = f64::from_str(fields[5])
            .map_err(|_| anyhow!("Invalid bitrate: {:?}", fields[5]))?;

        if !bitrate_mbps.is_finite() || bitrate_mbps <= 0.0 {
            return Err(anyhow!("Bitrate must be positive: {}", bitrate_mbps));
        }

        let resolution = fields
            .get(6)
            .filter(|res| !res.is_empty())
            .map(|res| res.to_string());

        Ok(CsvRow {
            brand: fields[0].to_string(),
            name: fields[1].to_string(),
            format: fields[2].to_string(),
            frame_rate: fields[3].to_string(),
            setting: fields[4].to_string(),
            bitrate_mbps,
            resolution,
        })
    }
}

/// Parses the CSV text into a catalog.
///
/// Malformed rows are skipped with a warning.
///
/// # Errors
///
/// Returns an error if no row could be parsed or two devices end up with
/// the same id.
pub fn parse_csv(text: &str) -> Result<Catalog> {
    let mut devices: Vec<Device> = Vec::new();

    for (line_no, line) in text.trim().lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<CsvRow>() {
            Ok(row) => insert_row(&mut devices, row),
            Err(e) => warn!("Skipping CSV line {}: {}", line_no + 1, e),
        }
    }

    if devices.is_empty() {
        return Err(anyhow!("CSV catalog contains no valid rows"));
    }

    let catalog = Catalog::new(devices);
    catalog.validate()?;

    info!("Parsed CSV catalog with {} devices", catalog.devices().len());
    Ok(catalog)
}

fn insert_row(devices: &mut Vec<Device>, row: CsvRow) {
    let device = position_or_push(
        devices,
        |d| d.brand == row.brand && d.name == row.name,
        || Device::new(&row.brand, &row.name),
    );

    let format = position_or_push(
        &mut device.formats,
        |f| f.name == row.format,
        || Format { name: row.format.clone(), ..Default::default() },
    );

    let frame_rate = position_or_push(
        &mut format.frame_rates,
        |r| r.label == row.frame_rate,
        || FrameRate { label: row.frame_rate.clone(), ..Default::default() },
    );

    frame_rate.settings.push(Setting {
        name: row.setting,
        bitrate_mbps: row.bitrate_mbps,
        resolution: row.resolution,
    });
}

//returns the first item matching `pred`, appending a new one if none does
fn position_or_push<T, P, F>(items: &mut Vec<T>, pred: P, make: F) -> &mut T
where
    P: Fn(&T) -> bool,
    F: FnOnce() -> T,
{
    let index = match items.iter().position(pred) {
        Some(index) => index,
        None => {
            items.push(make());
            items.len() - 1
        }
    };
    &mut items[index]
}
