//! Console commands and their parser.

use std::str::FromStr;

use anyhow::anyhow;

use crate::calculator::STORAGE_OPTIONS;
use crate::error::Result;
use crate::selection::Level;

/// How the user referred to a device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceRef {
    /// Zero based catalog index.
    Index(usize),
    /// Device id, display name, or `brand name`.
    Key(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Brands,
    Devices { brand: Option<String> },
    Device(DeviceRef),
    //index is zero based, the user types one based numbers
    Select { level: Level, index: usize },
    Cycle { level: Level, step: isize },
    Storage(f64),
    Storages,
    Show,
    Json,
    Export,
    Reset,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  brands                    list brands
  devices [brand]           list devices
  device <n|id|name>        select a device
  format <n>                select a format
  fps <n>                   select a frame rate
  setting <n>               select a quality setting
  next|prev <level>         step through device, format, fps or setting
  storage <gb|label>        set the storage capacity, e.g. 128 or 1TB
  storages                  list storage presets
  show                      show the selection and the estimate
  json                      print the estimate as JSON
  export                    print the catalog as CSV
  reset                     clear the selection
  help                      show this help
  quit                      exit";

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "brands" => Command::Brands,
            "devices" | "ls" => Command::Devices {
                brand: (!rest.is_empty()).then(|| rest.to_string()),
            },
            "device" => Command::Device(parse_device_ref(rest)?),
            "format" => select(Level::Format, rest)?,
            "fps" | "framerate" => select(Level::FrameRate, rest)?,
            "setting" | "quality" => select(Level::Setting, rest)?,
            "next" => Command::Cycle { level: parse_level(rest)?, step: 1 },
            "prev" => Command::Cycle { level: parse_level(rest)?, step: -1 },
            "storage" => Command::Storage(parse_storage(rest)?),
            "storages" => Command::Storages,
            "show" | "" => Command::Show,
            "json" => Command::Json,
            "export" => Command::Export,
            "reset" => Command::Reset,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => {
                return Err(anyhow!(
                    "Unknown command '{}', type 'help' for the list",
                    other
                ))
            }
        };

        Ok(command)
    }
}

fn select(level: Level, arg: &str) -> Result<Command> {
    Ok(Command::Select { level, index: parse_number(arg)? })
}

fn parse_level(arg: &str) -> Result<Level> {
    if arg.is_empty() {
        return Err(anyhow!("Missing level: device, format, fps or setting"));
    }
    arg.parse()
}

//one based on the console, zero based inside
fn parse_number(arg: &str) -> Result<usize> {
    let number: usize = arg
        .parse()
        .map_err(|_| anyhow!("Expected an option number, got '{}'", arg))?;
    number.checked_sub(1).ok_or_else(|| anyhow!("Option numbers start at 1"))
}

fn parse_device_ref(arg: &str) -> Result<DeviceRef> {
    if arg.is_empty() {
        return Err(anyhow!("Missing device number, id or name"));
    }
    if arg.chars().all(|c| c.is_ascii_digit()) {
        return parse_number(arg).map(DeviceRef::Index);
    }
    Ok(DeviceRef::Key(arg.to_string()))
}

fn parse_storage(arg: &str) -> Result<f64> {
    if let Some(option) =
        STORAGE_OPTIONS.iter().find(|o| o.label.eq_ignore_ascii_case(arg))
    {
        return Ok(option.gb);
    }

    let lower = arg.to_ascii_lowercase();
    let number = lower.strip_suffix("gb").unwrap_or(&lower).trim();
    let gb: f64 = number
        .parse()
        .map_err(|_| anyhow!("Expected a capacity in GB, got '{}'", arg))?;

    if !gb.is_finite() || gb < 0.0 {
        return Err(anyhow!("Storage must be zero or more GB"));
    }
    Ok(gb)
}
