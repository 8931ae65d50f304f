use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

/// A level of the catalog tree, ordered from the root down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Device,
    Format,
    FrameRate,
    Setting,
}

impl Level {
    pub const ALL: [Level; 4] =
        [Level::Device, Level::Format, Level::FrameRate, Level::Setting];

    pub fn parent(self) -> Option<Level> {
        match self {
            Level::Device => None,
            Level::Format => Some(Level::Device),
            Level::FrameRate => Some(Level::Format),
            Level::Setting => Some(Level::FrameRate),
        }
    }

    /// Every level strictly below this one, top to bottom.
    pub fn descendants(self) -> impl Iterator<Item = Level> {
        Level::ALL.into_iter().filter(move |level| *level > self)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Device => "device",
            Level::Format => "format",
            Level::FrameRate => "frame rate",
            Level::Setting => "setting",
        };
        f.write_str(name)
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "device" | "dev" => Ok(Level::Device),
            "format" | "fmt" => Ok(Level::Format),
            "fps" | "framerate" | "frame-rate" | "rate" => Ok(Level::FrameRate),
            "setting" | "quality" => Ok(Level::Setting),
            other => Err(anyhow!("Unknown level: {}", other)),
        }
    }
}
