//! GPIO vocabulary types.
//!
//! - `LineId` - Hardware line number, stable for the line's lifetime
//! - `LineHandle` - Opaque ownership token returned by the platform
//! - `InterruptId` - Platform interrupt source resolved from a line
//! - `Direction` / `Edge` - Line configuration

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Hardware line identifier (e.g. a BCM GPIO number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u32);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO {}", self.0)
    }
}

impl From<u32> for LineId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Ownership token for an acquired line.
///
/// Only a `Platform` implementation mints handles; the core treats them as
/// opaque and hands them back on every subsequent call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineHandle(u32);

impl LineHandle {
    /// Wrap a platform-specific raw handle value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw handle value, meaningful only to the platform that issued it.
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

/// Platform interrupt source number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterruptId(pub u32);

impl fmt::Display for InterruptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IRQ {}", self.0)
    }
}

/// Line direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    Input = 0,
    Output = 1,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Self::Input),
            "output" => Ok(Self::Output),
            _ => Err(format!("unknown Direction: {s:?}, expected \"input\" or \"output\"")),
        }
    }
}

/// Edge that triggers an interrupt.
///
/// Buttons are wired active-low, so a press is a falling edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    #[default]
    Falling,
    Rising,
    Both,
}

impl Edge {
    /// Whether a registration for `self` fires on an observed `transition`.
    ///
    /// `transition` is a concrete edge (`Falling` or `Rising`).
    pub fn triggers_on(&self, transition: Edge) -> bool {
        match self {
            Self::Both => true,
            edge => *edge == transition,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Falling => write!(f, "falling"),
            Self::Rising => write!(f, "rising"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl FromStr for Edge {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "falling" => Ok(Self::Falling),
            "rising" => Ok(Self::Rising),
            "both" => Ok(Self::Both),
            _ => Err(format!("unknown Edge: {s:?}")),
        }
    }
}
