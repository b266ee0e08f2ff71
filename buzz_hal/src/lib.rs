//! # Buzz HAL Library
//!
//! Interrupt-driven buzzer lockout. Each indicator unit pairs a button with
//! an LED; the first press after a reset lights its LED and locks out every
//! other button until the reset button is pressed.
//!
//! # Module Structure
//!
//! - [`line`] - Digital line lifecycle and interrupt binding
//! - [`latch`] - Lock-free shared press latch
//! - [`buzzer`] - Indicator unit (button + LED)
//! - [`reset`] - Reset unit
//! - [`core`] - `BuzzerSystem` orchestration (init, rollback, teardown)
//! - [`platform_registry`] - Platform factory registration
//! - [`drivers`] - Platform implementations
//! - [`error`] - Line and system errors
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      BuzzerSystem                            │
//! │  ┌──────────────┐  ┌──────────────┐       ┌──────────────┐   │
//! │  │ IndicatorUnit│  │ IndicatorUnit│  ...  │  ResetUnit   │   │
//! │  │ button ─► LED│  │ button ─► LED│       │ button       │   │
//! │  └──────┬───────┘  └──────┬───────┘       └──────┬───────┘   │
//! │         └─────────────────┴───── SharedLatch ────┘           │
//! │                            │                                 │
//! │                            ▼                                 │
//! │                   ┌────────────────┐                         │
//! │                   │  Platform      │ (trait object)          │
//! │                   └────────────────┘                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod buzzer;
pub mod core;
pub mod drivers;
pub mod error;
pub mod latch;
pub mod line;
pub mod platform_registry;
pub mod reset;

// Re-export key types for convenience
pub use crate::buzzer::{IndicatorUnit, LedRef};
pub use crate::core::BuzzerSystem;
pub use crate::error::{LineError, SystemError, UnitId};
pub use crate::latch::{LatchState, SharedLatch};
pub use crate::line::{DigitalLine, LineState};
pub use crate::platform_registry::PlatformRegistry;
pub use crate::reset::{LedRefs, ResetUnit};
