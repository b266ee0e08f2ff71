//! GPIO platform trait and error types.
//!
//! This module defines:
//! - `Platform` trait - Outward interface to the GPIO controller
//! - `PlatformError` enum - Platform-side failure causes
//! - `PlatformFactory` type alias - Factory function type
//! - `InterruptHandler` type alias - Edge callback bound to one unit

use crate::gpio::config::SystemConfig;
use crate::gpio::types::{Direction, Edge, InterruptId, LineHandle, LineId};
use std::sync::Arc;
use thiserror::Error;

/// Error types reported by a platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// Line is already owned by someone else
    #[error("Line busy: {0}")]
    Busy(String),

    /// Operation is not supported for this line
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Handle does not refer to a line owned through this platform
    #[error("Unknown handle: {0}")]
    UnknownHandle(u32),

    /// Hardware or kernel I/O failure
    #[error("I/O failure: {0}")]
    Io(String),

    /// Platform initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),
}

/// Edge callback registered for an interrupt source.
///
/// Runs asynchronously, possibly on several execution contexts at once.
/// Implementations must not block, sleep, lock or allocate.
pub type InterruptHandler = Arc<dyn Fn() + Send + Sync>;

/// Factory function type for creating platform instances.
pub type PlatformFactory = fn() -> Box<dyn Platform>;

/// Interface to the GPIO controller.
///
/// The core only ever calls outward through this trait; every ownership,
/// exposure and interrupt concern is the platform's.
///
/// # Lifecycle
///
/// 1. `init()` - Called once, before the platform is shared
/// 2. line calls - From the single-threaded orchestrator during init/teardown
/// 3. `set_level()` - Also from interrupt handlers; must be lock-free
///
/// # Interrupt contract
///
/// Once `unbind_interrupt()` returns, the handler for that source is not
/// running and will not run again.
pub trait Platform: Send + Sync {
    /// Returns the platform's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the platform's semantic version.
    fn version(&self) -> &'static str;

    /// Initialize the platform from the system configuration.
    ///
    /// Platform-specific settings live under `config.driver_config[name]`.
    fn init(&mut self, config: &SystemConfig) -> Result<(), PlatformError>;

    /// Whether `id` names a line this controller has.
    fn is_valid_line(&self, id: LineId) -> bool;

    /// Request exclusive ownership of a line.
    fn acquire_line(&self, id: LineId, label: &str) -> Result<LineHandle, PlatformError>;

    /// Relinquish ownership.
    fn release_line(&self, handle: LineHandle);

    /// Set direction. Output lines come up driven low.
    fn set_direction(&self, handle: LineHandle, direction: Direction) -> Result<(), PlatformError>;

    /// Drive an output line. Infallible and lock-free.
    fn set_level(&self, handle: LineHandle, high: bool);

    /// Make the line observable outside the process.
    fn expose_externally(&self, handle: LineHandle, writable: bool) -> Result<(), PlatformError>;

    /// Undo `expose_externally`.
    fn withdraw_exposure(&self, handle: LineHandle);

    /// Resolve the interrupt source for an input line.
    fn line_to_interrupt_source(&self, handle: LineHandle) -> Result<InterruptId, PlatformError>;

    /// Register `handler` to run on `edge`.
    fn bind_interrupt(
        &self,
        irq: InterruptId,
        edge: Edge,
        handler: InterruptHandler,
    ) -> Result<(), PlatformError>;

    /// Unregister the handler for `irq`; waits for an in-flight invocation.
    fn unbind_interrupt(&self, irq: InterruptId);

    /// Handle platform-specific console commands (extensibility point).
    /// Default: not supported, returns None
    fn handle_custom_command(&self, _command: &str) -> Option<String> {
        None
    }
}
