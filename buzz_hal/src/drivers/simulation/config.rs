//! Simulation platform configuration.
//!
//! Parsed from the `[driver_config.simulation]` table of `buzzer.toml`:
//!
//! ```toml
//! [driver_config.simulation]
//! line_count = 54
//! no_interrupt_lines = [4]
//! faults = [{ line = 25, op = "direction" }]
//! ```

use buzz_common::consts::DEFAULT_SIM_LINE_COUNT;
use buzz_common::gpio::platform::PlatformError;
use serde::{Deserialize, Serialize};

fn default_line_count() -> u32 {
    DEFAULT_SIM_LINE_COUNT
}

/// Platform operation that can be made to fail for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimFault {
    /// `acquire_line` fails
    Acquire,
    /// `set_direction` fails
    Direction,
    /// `expose_externally` fails
    Expose,
    /// `line_to_interrupt_source` fails
    InterruptSource,
    /// `bind_interrupt` fails
    Register,
}

/// One configured fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaultConfig {
    /// Line the fault applies to.
    pub line: u32,
    /// Operation that fails.
    pub op: SimFault,
}

/// Simulation platform settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Lines `0..line_count` are valid.
    #[serde(default = "default_line_count")]
    pub line_count: u32,

    /// Lines that cannot generate edge events.
    #[serde(default)]
    pub no_interrupt_lines: Vec<u32>,

    /// Injected failures.
    #[serde(default)]
    pub faults: Vec<FaultConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            line_count: default_line_count(),
            no_interrupt_lines: Vec::new(),
            faults: Vec::new(),
        }
    }
}

impl SimulationConfig {
    /// Parse from the platform's TOML section; `None` yields defaults.
    pub fn from_section(section: Option<&toml::Value>) -> Result<Self, PlatformError> {
        let Some(section) = section else {
            return Ok(Self::default());
        };
        let config: Self = section.clone().try_into().map_err(|e| {
            PlatformError::InitFailed(format!("invalid [driver_config.simulation]: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate line numbers against `line_count`.
    pub fn validate(&self) -> Result<(), PlatformError> {
        if self.line_count == 0 {
            return Err(PlatformError::InitFailed(
                "line_count must be greater than 0".to_string(),
            ));
        }
        let out_of_range = self
            .no_interrupt_lines
            .iter()
            .chain(self.faults.iter().map(|f| &f.line))
            .find(|line| **line >= self.line_count);
        if let Some(line) = out_of_range {
            return Err(PlatformError::InitFailed(format!(
                "line {} outside 0..{}",
                line, self.line_count
            )));
        }
        Ok(())
    }
}
