//! Prelude module for common re-exports.
//!
//! ```rust
//! use buzz_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::gpio::config::{BuzzerConfig, LineConfig, ResetConfig, SystemConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MAX_BUZZERS, SERVICE_NAME};

// ─── GPIO ───────────────────────────────────────────────────────────
pub use crate::gpio::platform::{InterruptHandler, Platform, PlatformError, PlatformFactory};
pub use crate::gpio::types::{Direction, Edge, InterruptId, LineHandle, LineId};
