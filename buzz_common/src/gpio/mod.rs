//! GPIO platform vocabulary and system configuration.
//!
//! Shared between the core and every platform driver.

pub mod config;
pub mod platform;
pub mod types;
