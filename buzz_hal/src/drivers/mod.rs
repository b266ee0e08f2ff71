//! GPIO platform implementations.
//!
//! - [`simulation`] - In-process controller for development and testing
//!
//! # Adding New Platforms
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `Platform` trait from `buzz_common::gpio::platform`
//! 3. Register its factory in [`register_all_platforms`]

pub mod simulation;

use crate::platform_registry::PlatformRegistry;

/// Register all built-in platforms.
pub fn register_all_platforms(registry: &mut PlatformRegistry) {
    registry.register("simulation", simulation::create_platform);
}
