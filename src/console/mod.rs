//! Line oriented front end for the calculator.
//!
//! Each input line is parsed into a `Command` and executed against the
//! session's `CascadeSelector`. Errors are reported back to the user and
//! never end the session.

mod command;

use anyhow::anyhow;
use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub use command::{Command, DeviceRef, HELP};

use crate::calculator::{storage_label, RecordingEstimate, STORAGE_OPTIONS};
use crate::error::Result;
use crate::selection::{CascadeSelector, Level};

/// Result of executing one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Print(String),
    Quit,
}

/// One calculator session: a selection plus the chosen storage capacity.
pub struct Console {
    selector: CascadeSelector,
    storage_gb: f64,
}

impl Console {
    pub fn new(selector: CascadeSelector, storage_gb: f64) -> Self {
        Self { selector, storage_gb }
    }

    pub fn selector(&self) -> &CascadeSelector {
        &self.selector
    }

    pub fn storage_gb(&self) -> f64 {
        self.storage_gb
    }

    /// The estimate for the current setting, `None` until a setting is
    /// selected.
    pub fn estimate(&self) -> Result<Option<RecordingEstimate>> {
        self.selector
            .current_setting()
            .map(|s| RecordingEstimate::compute(s.bitrate_mbps, self.storage_gb))
            .transpose()
    }

    /// Executes a command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command refers to a missing option or
    /// selects a level whose parent is unset.
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        let text = match command {
            Command::Brands => self.selector.catalog().brands().join("\n"),
            Command::Devices { brand } => self.render_devices(brand.as_deref()),
            Command::Device(device) => {
                let index = match device {
                    DeviceRef::Index(index) => index,
                    DeviceRef::Key(key) => {
                        self.selector.catalog().find_device(&key).ok_or_else(
                            || anyhow!("No device named '{}'", key),
                        )?
                    }
                };
                self.selector.select_device(index)?;
                self.render_show()?
            }
            Command::Select { level, index } => {
                self.selector.select(level, index)?;
                self.render_show()?
            }
            Command::Cycle { level, step } => {
                self.selector.cycle(level, step)?;
                self.render_show()?
            }
            Command::Storage(gb) => {
                self.storage_gb = gb;
                info!("Storage capacity set to {} GB", gb);
                self.render_show()?
            }
            Command::Storages => STORAGE_OPTIONS
                .iter()
                .map(|option| format!("{:>6}  ({} GB)", option.label, option.gb))
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Show => self.render_show()?,
            Command::Json => match self.estimate()? {
                Some(estimate) => serde_json::to_string_pretty(&estimate)?,
                None => return Err(anyhow!("Select a setting first")),
            },
            Command::Export => self.selector.catalog().to_csv(),
            Command::Reset => {
                self.selector.reset();
                self.render_show()?
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Outcome::Quit),
        };

        Ok(Outcome::Print(text))
    }

    /// Reads commands line by line from `reader` until `quit` or end of
    /// input, writing every response to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading or writing fails.
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let outcome = line
                .parse::<Command>()
                .and_then(|command| self.execute(command));

            let text = match outcome {
                Ok(Outcome::Print(text)) => text,
                Ok(Outcome::Quit) => break,
                Err(e) => {
                    warn!("Command '{}' failed: {}", line.trim(), e);
                    format!("error: {}", e)
                }
            };

            writer.write_all(text.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }

    fn render_devices(&self, brand: Option<&str>) -> String {
        let catalog = self.selector.catalog();
        let devices: Vec<_> = match brand {
            Some(brand) => catalog.devices_by_brand(brand),
            None => catalog.devices().iter().enumerate().collect(),
        };

        if devices.is_empty() {
            return "No devices for this brand".to_string();
        }

        devices
            .iter()
            .map(|(i, d)| format!("{:>3}. {} {} [{}]", i + 1, d.brand, d.name, d.id))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_show(&self) -> Result<String> {
        let mut lines = Vec::new();

        for level in Level::ALL {
            let value = self
                .selector
                .selected_label(level)
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!("{:<11} {}", format!("{}:", title(level)), value));
        }

        if let Some(resolution) = self
            .selector
            .current_setting()
            .and_then(|setting| setting.resolution.as_deref())
        {
            lines.push(format!("{:<11} {}", "Resolution:", resolution));
        }
        lines.push(format!("{:<11} {}", "Storage:", storage_label(self.storage_gb)));

        match self.estimate()? {
            Some(estimate) => {
                lines.push(format!(
                    "Max recording time: {} ({} min)",
                    estimate.duration_label(),
                    estimate.max_minutes
                ));
                lines.push(format!(
                    "Data rate:          {:.1} MB/s",
                    estimate.data_rate_mbps
                ));
                lines.push(format!(
                    "One minute of file: {} MB",
                    estimate.per_minute_mb.floor()
                ));
            }
            None => {
                if let Some(level) = self.next_open_level() {
                    lines.push(format!("Choose a {}:", level));
                    for (i, option) in
                        self.selector.options(level).iter().enumerate()
                    {
                        lines.push(format!("{:>3}. {}", i + 1, option));
                    }
                } else if self.selector.path().device.is_some() {
                    lines.push("No recording settings for this selection".to_string());
                }
            }
        }

        Ok(lines.join("\n"))
    }

    //first unset level that has options to pick from
    fn next_open_level(&self) -> Option<Level> {
        Level::ALL.into_iter().find(|level| {
            self.selector.selected(*level).is_none()
                && self.selector.option_count(*level).unwrap_or(0) > 0
        })
    }
}

fn title(level: Level) -> &'static str {
    match level {
        Level::Device => "Device",
        Level::Format => "Format",
        Level::FrameRate => "Frame rate",
        Level::Setting => "Setting",
    }
}
