//! Embedded default catalog, used when no catalog file is configured or the
//! configured one cannot be loaded.

use super::schemas::{Device, Format, FrameRate, Setting};
use super::Catalog;

const UHD: &str = "3840x2160";
const DCI_8K: &str = "8192x4320";

fn setting(name: &str, bitrate_mbps: f64, resolution: &str) -> Setting {
    Setting {
        name: name.to_string(),
        bitrate_mbps,
        resolution: Some(resolution.to_string()),
    }
}

fn frame_rate(label: &str, settings: Vec<Setting>) -> FrameRate {
    FrameRate { label: label.to_string(), settings }
}

fn format(name: &str, frame_rates: Vec<FrameRate>) -> Format {
    Format { name: name.to_string(), frame_rates }
}

fn device(brand: &str, name: &str, formats: Vec<Format>) -> Device {
    Device { formats, ..Device::new(brand, name) }
}

fn standard_and_hq(label: &str, std: f64, hq: f64) -> FrameRate {
    frame_rate(
        label,
        vec![setting("Standard", std, UHD), setting("High Quality", hq, UHD)],
    )
}

pub(super) fn builtin_catalog() -> Catalog {
    let devices = vec![
        device(
            "Sony",
            "FX30",
            vec![
                format(
                    "XAVC S-I 4K",
                    vec![
                        standard_and_hq("24p", 600.0, 800.0),
                        standard_and_hq("30p", 600.0, 800.0),
                    ],
                ),
                format(
                    "XAVC S 4K",
                    vec![
                        standard_and_hq("24p", 100.0, 150.0),
                        standard_and_hq("30p", 100.0, 150.0),
                    ],
                ),
            ],
        ),
        device(
            "Canon",
            "EOS R5",
            vec![
                format(
                    "Canon RAW 8K",
                    vec![frame_rate(
                        "30p",
                        vec![setting("Standard", 2600.0, DCI_8K)],
                    )],
                ),
                format(
                    "H.265 4K",
                    vec![
                        standard_and_hq("30p", 230.0, 470.0),
                        frame_rate("60p", vec![setting("Standard", 340.0, UHD)]),
                    ],
                ),
            ],
        ),
        device(
            "Apple",
            "iPhone 14 Pro",
            vec![
                format(
                    "ProRes 4K",
                    vec![
                        frame_rate(
                            "24p",
                            vec![
                                setting("ProRes 422", 1100.0, UHD),
                                setting("ProRes 422 HQ", 1650.0, UHD),
                            ],
                        ),
                        frame_rate(
                            "30p",
                            vec![
                                setting("ProRes 422", 1375.0, UHD),
                                setting("ProRes 422 HQ", 2060.0, UHD),
                            ],
                        ),
                    ],
                ),
                format(
                    "H.265 4K",
                    vec![
                        frame_rate("24p", vec![setting("Standard", 85.0, UHD)]),
                        frame_rate(
                            "30p",
                            vec![setting("Standard", 100.0, UHD)],
                        ),
                    ],
                ),
            ],
        ),
    ];

    Catalog::new(devices)
}
