//! Cascading selection over the device catalog.
//!
//! The `CascadeSelector` keeps a `SelectionPath` through the catalog tree.
//! Changing the selection at one level clears every level below it and,
//! depending on the `AutoSelect` policy, selects the first child of each
//! dependent level. A selection never holds a stale combination.

mod level;

use std::sync::Arc;

use anyhow::anyhow;
use log::{info, warn};

pub use crate::catalog::SelectionPath;
pub use level::Level;

use crate::catalog::{Catalog, Setting};
use crate::error::Result;

/// What happens to the dependent levels after a selection changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AutoSelect {
    /// Select the first option of every dependent level that has one.
    #[default]
    FirstChild,
    /// Leave the dependent levels unset.
    None,
}

/// The selection state machine.
pub struct CascadeSelector {
    catalog: Arc<Catalog>,
    path: SelectionPath,
    auto_select: AutoSelect,
}

impl CascadeSelector {
    /// Creates a selector with nothing selected.
    pub fn new(catalog: Arc<Catalog>, auto_select: AutoSelect) -> Self {
        Self { catalog, path: SelectionPath::default(), auto_select }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn path(&self) -> SelectionPath {
        self.path
    }

    pub fn auto_select(&self) -> AutoSelect {
        self.auto_select
    }

    /// The selected index at `level`.
    pub fn selected(&self, level: Level) -> Option<usize> {
        match level {
            Level::Device => self.path.device,
            Level::Format => self.path.format,
            Level::FrameRate => self.path.frame_rate,
            Level::Setting => self.path.setting,
        }
    }

    /// Selects `index` at `level`, then resets the levels below it.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the selection untouched, if the parent
    /// level is unset or `index` is out of range.
    pub fn select(&mut self, level: Level, index: usize) -> Result<()> {
        let count = self.require_option_count(level)?;

        if index >= count {
            warn!("Rejected {} index {}, {} options available", level, index, count);
            return Err(anyhow!(
                "No {} number {} (there are {} options)",
                level,
                index + 1,
                count
            ));
        }

        self.set(level, Some(index));
        self.cascade_from(level);
        info!("Selected {} {}: {:?}", level, index, self.path);
        Ok(())
    }

    pub fn select_device(&mut self, index: usize) -> Result<()> {
        self.select(Level::Device, index)
    }

    pub fn select_format(&mut self, index: usize) -> Result<()> {
        self.select(Level::Format, index)
    }

    pub fn select_frame_rate(&mut self, index: usize) -> Result<()> {
        self.select(Level::FrameRate, index)
    }

    pub fn select_setting(&mut self, index: usize) -> Result<()> {
        self.select(Level::Setting, index)
    }

    /// Moves the selection at `level` by `step` positions, wrapping around
    /// at both ends. An unset level starts from the first option when
    /// stepping forward and from the last when stepping backward.
    ///
    /// Does nothing when the level has no options.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent level is unset.
    pub fn cycle(&mut self, level: Level, step: isize) -> Result<()> {
        let count = self.require_option_count(level)?;
        if count == 0 {
            return Ok(());
        }

        let next = match self.selected(level) {
            Some(current) => (current as isize + step).rem_euclid(count as isize) as usize,
            None if step < 0 => count - 1,
            None => 0,
        };

        self.select(level, next)
    }

    /// Clears the whole selection.
    pub fn reset(&mut self) {
        self.path = SelectionPath::default();
        info!("Selection reset");
    }

    /// Number of options at `level`, or `None` when its parent is unset.
    pub fn option_count(&self, level: Level) -> Option<usize> {
        let catalog = &self.catalog;
        let count = match level {
            Level::Device => catalog.devices().len(),
            Level::Format => catalog.device(self.path.device?)?.formats.len(),
            Level::FrameRate => {
                catalog
                    .format(self.path.device?, self.path.format?)?
                    .frame_rates
                    .len()
            }
            Level::Setting => {
                catalog
                    .frame_rate(
                        self.path.device?,
                        self.path.format?,
                        self.path.frame_rate?,
                    )?
                    .settings
                    .len()
            }
        };
        Some(count)
    }

    /// Option labels at `level`. Empty when the parent is unset or has no
    /// children.
    pub fn options(&self, level: Level) -> Vec<String> {
        let catalog = &self.catalog;
        let path = &self.path;
        match level {
            Level::Device => catalog
                .devices()
                .iter()
                .map(|d| format!("{} {}", d.brand, d.name))
                .collect(),
            Level::Format => path
                .device
                .and_then(|d| catalog.device(d))
                .map(|d| d.formats.iter().map(|f| f.name.clone()).collect())
                .unwrap_or_default(),
            Level::FrameRate => path
                .device
                .zip(path.format)
                .and_then(|(d, f)| catalog.format(d, f))
                .map(|f| f.frame_rates.iter().map(|r| r.label.clone()).collect())
                .unwrap_or_default(),
            Level::Setting => path
                .device
                .zip(path.format)
                .zip(path.frame_rate)
                .and_then(|((d, f), r)| catalog.frame_rate(d, f, r))
                .map(|r| r.settings.iter().map(Setting::label).collect())
                .unwrap_or_default(),
        }
    }

    pub fn device_options(&self) -> Vec<String> {
        self.options(Level::Device)
    }

    pub fn format_options(&self) -> Vec<String> {
        self.options(Level::Format)
    }

    pub fn frame_rate_options(&self) -> Vec<String> {
        self.options(Level::FrameRate)
    }

    pub fn setting_options(&self) -> Vec<String> {
        self.options(Level::Setting)
    }

    /// Label of the selected option at `level`.
    pub fn selected_label(&self, level: Level) -> Option<String> {
        let index = self.selected(level)?;
        self.options(level).into_iter().nth(index)
    }

    /// The fully selected setting, if every level is set.
    pub fn current_setting(&self) -> Option<&Setting> {
        self.catalog.lookup(&self.path)
    }

    fn require_option_count(&self, level: Level) -> Result<usize> {
        self.option_count(level).ok_or_else(|| match level.parent() {
            Some(parent) => anyhow!("Select a {} first", parent),
            None => anyhow!("No options for {}", level),
        })
    }

    fn set(&mut self, level: Level, index: Option<usize>) {
        match level {
            Level::Device => self.path.device = index,
            Level::Format => self.path.format = index,
            Level::FrameRate => self.path.frame_rate = index,
            Level::Setting => self.path.setting = index,
        }
    }

    //clear every level below `level`, then auto select per policy
    fn cascade_from(&mut self, level: Level) {
        for child in level.descendants() {
            self.set(child, None);
        }

        if self.auto_select == AutoSelect::None {
            return;
        }

        for child in level.descendants() {
            if self.option_count(child).unwrap_or(0) == 0 {
                break;
            }
            self.set(child, Some(0));
        }
    }
}
