//! Recording time calculator.
//!
//! Given a device's format, frame rate and quality setting from the device
//! catalog, plus a storage capacity, derives the maximum recording duration,
//! the data rate and the size of one minute of footage.

pub mod app_config;
pub mod calculator;
pub mod catalog;
pub mod console;
pub mod error;
pub mod selection;
