//! Buzzer Common Library
//!
//! This crate provides shared constants, the GPIO platform interface and
//! configuration loading utilities for all buzzer workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - System-wide limits and default paths
//! - [`config`] - Configuration loading traits and types
//! - [`gpio`] - Line vocabulary, the `Platform` trait and `SystemConfig`
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! buzz_common = { path = "../buzz_common" }
//! ```
//!
//! Then import:
//! ```rust
//! use buzz_common::config::{ConfigLoader, SharedConfig};
//! use buzz_common::gpio::types::{Direction, Edge, LineId};
//! ```

pub mod config;
pub mod consts;
pub mod gpio;
pub mod prelude;
