//! Digital line lifecycle.
//!
//! A `DigitalLine` owns one hardware line from acquisition until release.
//! Construction is a scoped acquisition: the value exists as soon as the
//! platform grants ownership, and its `Drop` releases the line, so every
//! early return on a later step rolls back what was already done.
//!
//! ```text
//!  acquire ──► configure ──► (expose) ──► bind (Input only) ──► release
//!     │            │             │              │
//!     └────────────┴─────────────┴──────────────┴──► release on failure
//! ```

use crate::error::{LineError, LineResult};
use buzz_common::gpio::platform::{InterruptHandler, Platform, PlatformError};
use buzz_common::gpio::types::{Direction, Edge, InterruptId, LineHandle, LineId};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, trace};

/// Lifecycle state of a constructed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    /// Owned, direction set (and exposed if requested)
    Configured,
    /// Input with a live interrupt registration
    Bound,
    /// Ownership relinquished; the line does nothing any more
    Released,
}

/// One owned hardware line.
pub struct DigitalLine {
    id: LineId,
    label: String,
    direction: Direction,
    handle: LineHandle,
    exposed: bool,
    interrupt: Option<InterruptId>,
    asserted: AtomicBool,
    released: AtomicBool,
    platform: Arc<dyn Platform>,
}

impl DigitalLine {
    /// Validate, acquire and configure a line.
    ///
    /// Output lines are left deasserted. With `expose`, the line is made
    /// externally observable with a fixed direction.
    ///
    /// # Errors
    /// `InvalidLine`, `AcquisitionFailed`, `ConfigurationFailed` or
    /// `ExposureFailed`. The line is never left held on error.
    pub fn acquire_and_configure(
        platform: &Arc<dyn Platform>,
        id: LineId,
        label: &str,
        direction: Direction,
        expose: bool,
    ) -> LineResult<Self> {
        if !platform.is_valid_line(id) {
            error!("Invalid line: {}", id);
            return Err(LineError::InvalidLine { line: id });
        }

        let handle = platform.acquire_line(id, label).map_err(|source| {
            error!("Failed to request {} ({}): {}", id, label, source);
            LineError::AcquisitionFailed { line: id, source }
        })?;

        let mut line = Self {
            id,
            label: label.to_string(),
            direction,
            handle,
            exposed: false,
            interrupt: None,
            asserted: AtomicBool::new(false),
            released: AtomicBool::new(false),
            platform: Arc::clone(platform),
        };

        platform.set_direction(handle, direction).map_err(|source| {
            error!("Failed to set {} as {}: {}", id, direction, source);
            LineError::ConfigurationFailed { line: id, source }
        })?;
        if direction == Direction::Output {
            platform.set_level(handle, false);
        }

        if expose {
            platform.expose_externally(handle, false).map_err(|source| {
                error!("Failed to export {}: {}", id, source);
                LineError::ExposureFailed { line: id, source }
            })?;
            line.exposed = true;
        }

        debug!("Configured {} '{}' as {}", id, line.label, direction);
        Ok(line)
    }

    /// Bind `handler` to `edge` events on this input line.
    ///
    /// Consumes the line: on error it has been fully released and is gone.
    ///
    /// # Errors
    /// `ConfigurationFailed` if the line is not an unbound input,
    /// `NoInterruptSource` or `RegistrationFailed` from the platform.
    pub fn bind_interrupt(mut self, edge: Edge, handler: InterruptHandler) -> LineResult<Self> {
        if self.direction != Direction::Input || self.interrupt.is_some() || self.is_released() {
            error!("Cannot bind interrupt on {} in state {:?}", self.id, self.state());
            return Err(LineError::ConfigurationFailed {
                line: self.id,
                source: PlatformError::Unsupported(format!(
                    "interrupt binding needs an unbound input line, {} is {:?} {}",
                    self.id,
                    self.state(),
                    self.direction
                )),
            });
        }

        let irq = self
            .platform
            .line_to_interrupt_source(self.handle)
            .map_err(|source| {
                error!("Failed to get an IRQ for '{}' ({}): {}", self.label, self.id, source);
                LineError::NoInterruptSource { line: self.id, source }
            })?;
        info!("Got {} for '{}' ({})", irq, self.label, self.id);

        self.platform
            .bind_interrupt(irq, edge, handler)
            .map_err(|source| {
                error!(
                    "Failed to register {} handler for '{}' ({}): {}",
                    edge, self.label, self.id, source
                );
                LineError::RegistrationFailed {
                    line: self.id,
                    irq,
                    source,
                }
            })?;

        self.interrupt = Some(irq);
        Ok(self)
    }

    /// Unbind, withdraw exposure and relinquish ownership.
    ///
    /// Only the first call has any effect.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(irq) = self.interrupt {
            self.platform.unbind_interrupt(irq);
        }
        if self.exposed {
            self.platform.withdraw_exposure(self.handle);
        }
        self.platform.release_line(self.handle);
        debug!("Released {} '{}'", self.id, self.label);
    }

    /// Drive an output line high. No effect on inputs or after release.
    #[inline]
    pub fn assert(&self) {
        self.drive(true);
    }

    /// Drive an output line low. No effect on inputs or after release.
    #[inline]
    pub fn deassert(&self) {
        self.drive(false);
    }

    #[inline]
    fn drive(&self, high: bool) {
        if self.direction != Direction::Output || self.is_released() {
            trace!(line = self.id.0, high, "drive ignored");
            return;
        }
        self.platform.set_level(self.handle, high);
        self.asserted.store(high, Ordering::SeqCst);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LineState {
        if self.is_released() {
            LineState::Released
        } else if self.interrupt.is_some() {
            LineState::Bound
        } else {
            LineState::Configured
        }
    }

    /// Last level driven through `assert`/`deassert`.
    pub fn is_asserted(&self) -> bool {
        self.asserted.load(Ordering::SeqCst)
    }

    /// Whether `release` has run.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Hardware line number.
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Diagnostic label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Configured direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Bound interrupt source. `Some` only for bound inputs.
    pub fn interrupt(&self) -> Option<InterruptId> {
        self.interrupt
    }

    /// Whether the line was exposed externally.
    pub fn is_exposed(&self) -> bool {
        self.exposed
    }
}

impl Drop for DigitalLine {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for DigitalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitalLine")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("direction", &self.direction)
            .field("interrupt", &self.interrupt)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
