//! System-wide constants for the buzzer workspace.
//!
//! Single source of truth for numeric limits and default paths.

use static_assertions::const_assert;

/// Canonical service name (used for logging and the default `SharedConfig`).
pub const SERVICE_NAME: &str = "buzz_hal";

/// Maximum number of indicator units (buzzers) a system may carry.
///
/// Bounds the reset unit's fixed-capacity LED reference list.
pub const MAX_BUZZERS: usize = 16;

/// Default number of lines exposed by the simulation platform (BCM283x bank).
pub const DEFAULT_SIM_LINE_COUNT: u32 = 54;

/// First interrupt number handed out by the simulation platform.
pub const SIM_IRQ_BASE: u32 = 100;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/buzz/buzzer.toml";

/// Name of the platform used when neither CLI nor config selects one.
pub const DEFAULT_PLATFORM: &str = "simulation";

// Every buzzer owns two lines and the reset unit one more.
const_assert!(MAX_BUZZERS * 2 + 1 <= DEFAULT_SIM_LINE_COUNT as usize);
