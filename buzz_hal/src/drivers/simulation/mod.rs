//! Simulation platform module.
//!
//! An in-process GPIO controller for development and testing without
//! hardware. Button presses are injected through `SimulationPlatform::press`
//! or the interactive console.

mod bank;
mod config;
mod platform;

pub use config::{FaultConfig, SimFault, SimulationConfig};
pub use platform::SimulationPlatform;

use buzz_common::gpio::platform::Platform;

/// Factory function to create a simulation platform instance.
pub fn create_platform() -> Box<dyn Platform> {
    Box::new(SimulationPlatform::new())
}
