//! Error types for line and system operations.
//!
//! Every variant is surfaced synchronously from the initialization call
//! chain. Nothing is retried: a failed acquisition is an environment fault.

use buzz_common::config::ConfigError;
use buzz_common::gpio::platform::PlatformError;
use buzz_common::gpio::types::{InterruptId, LineId};
use std::fmt;
use thiserror::Error;

/// Errors from a single line's acquire/configure/bind sequence.
///
/// When one of these is returned, every resource the failing call acquired
/// has already been released.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Platform does not know the line
    #[error("Invalid line: {line}")]
    InvalidLine {
        /// Line number
        line: LineId,
    },

    /// Line is owned elsewhere or could not be requested
    #[error("Failed to acquire {line}: {source}")]
    AcquisitionFailed {
        /// Line number
        line: LineId,
        /// Platform cause
        source: PlatformError,
    },

    /// Direction/level could not be set, or the line was misused
    #[error("Failed to configure {line}: {source}")]
    ConfigurationFailed {
        /// Line number
        line: LineId,
        /// Platform cause
        source: PlatformError,
    },

    /// External exposure failed
    #[error("Failed to expose {line}: {source}")]
    ExposureFailed {
        /// Line number
        line: LineId,
        /// Platform cause
        source: PlatformError,
    },

    /// Line cannot generate edge events
    #[error("No interrupt source for {line}: {source}")]
    NoInterruptSource {
        /// Line number
        line: LineId,
        /// Platform cause
        source: PlatformError,
    },

    /// Handler registration failed
    #[error("Failed to register handler for {line} ({irq}): {source}")]
    RegistrationFailed {
        /// Line number
        line: LineId,
        /// Interrupt source that refused the handler
        irq: InterruptId,
        /// Platform cause
        source: PlatformError,
    },
}

impl LineError {
    /// Line the error refers to.
    pub fn line(&self) -> LineId {
        match self {
            Self::InvalidLine { line }
            | Self::AcquisitionFailed { line, .. }
            | Self::ConfigurationFailed { line, .. }
            | Self::ExposureFailed { line, .. }
            | Self::NoInterruptSource { line, .. }
            | Self::RegistrationFailed { line, .. } => *line,
        }
    }

    /// Negative errno reported to the host.
    pub fn code(&self) -> i32 {
        let errno = match self {
            Self::InvalidLine { .. } => libc::ENODEV,
            Self::AcquisitionFailed { .. } => libc::EBUSY,
            Self::ConfigurationFailed { .. } => libc::EIO,
            Self::ExposureFailed { .. } => libc::EIO,
            Self::NoInterruptSource { .. } => libc::ENXIO,
            Self::RegistrationFailed { .. } => libc::EBUSY,
        };
        -errno
    }
}

/// Identifies a unit in orchestrator errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitId {
    /// Indicator unit by construction index (0-based)
    Buzzer(usize),
    /// The reset unit
    Reset,
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buzzer(idx) => write!(f, "buzzer {}", idx + 1),
            Self::Reset => write!(f, "reset button"),
        }
    }
}

/// Errors from system construction and initialization.
#[derive(Error, Debug, Clone)]
pub enum SystemError {
    /// Configuration invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No platform registered under this name
    #[error("Platform not found: {0}")]
    PlatformNotFound(String),

    /// Platform failed to initialize
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// A unit failed to initialize; the system was rolled back
    #[error("Failed to set up {unit}: {source}")]
    Unit {
        /// Failing unit
        unit: UnitId,
        /// Line-level cause
        source: LineError,
    },

    /// `init` called on an active system
    #[error("System already active")]
    AlreadyActive,
}

impl SystemError {
    /// Negative errno reported to the host.
    pub fn code(&self) -> i32 {
        match self {
            Self::Unit { source, .. } => source.code(),
            Self::Platform(PlatformError::Busy(_)) | Self::AlreadyActive => -libc::EBUSY,
            Self::Platform(_) => -libc::EIO,
            Self::Config(_) | Self::PlatformNotFound(_) => -libc::EINVAL,
        }
    }
}

/// Result type for line operations
pub type LineResult<T> = Result<T, LineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_error_codes() {
        let line = LineId(27);
        let cause = PlatformError::Io("boom".to_string());

        assert_eq!(LineError::InvalidLine { line }.code(), -libc::ENODEV);
        assert_eq!(
            LineError::AcquisitionFailed { line, source: cause.clone() }.code(),
            -libc::EBUSY
        );
        assert_eq!(
            LineError::NoInterruptSource { line, source: cause.clone() }.code(),
            -libc::ENXIO
        );
        assert_eq!(
            LineError::RegistrationFailed {
                line,
                irq: InterruptId(127),
                source: cause,
            }
            .line(),
            line
        );
    }

    #[test]
    fn test_system_error_propagates_unit_code() {
        let err = SystemError::Unit {
            unit: UnitId::Buzzer(1),
            source: LineError::InvalidLine { line: LineId(99) },
        };
        assert_eq!(err.code(), -libc::ENODEV);
        assert!(err.to_string().contains("buzzer 2"));
        assert!(err.to_string().contains("GPIO 99"));
    }

    #[test]
    fn test_config_error_is_einval() {
        let err: SystemError = ConfigError::ValidationError("bad".to_string()).into();
        assert_eq!(err.code(), -libc::EINVAL);
    }
}
