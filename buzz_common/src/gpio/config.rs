//! System configuration types.
//!
//! This module contains the configuration loaded from `buzzer.toml`:
//! - `SystemConfig` - Platform selection, shared settings and unit wiring
//! - `BuzzerConfig` / `ResetConfig` - Per-unit line assignments
//! - `LineConfig` - One line number plus its diagnostic label
//!
//! Which physical line plays which role is pure configuration data.

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{DEFAULT_PLATFORM, MAX_BUZZERS};
use crate::gpio::types::{Edge, LineId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

fn default_true() -> bool {
    true
}

/// One hardware line and its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineConfig {
    /// Hardware line number.
    pub line: LineId,
    /// Diagnostic label, passed to the platform on acquisition.
    pub label: String,
}

impl LineConfig {
    /// Convenience constructor.
    pub fn new(line: u32, label: impl Into<String>) -> Self {
        Self {
            line: LineId(line),
            label: label.into(),
        }
    }
}

/// Wiring of one indicator unit: a button and the LED it lights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuzzerConfig {
    /// Momentary switch input.
    pub button: LineConfig,
    /// Indicator output.
    pub led: LineConfig,
}

/// Wiring of the reset unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetConfig {
    /// Momentary switch input.
    pub button: LineConfig,
}

/// Main configuration loaded from `buzzer.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SystemConfig {
    /// Platform driver to load (e.g. "simulation").
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Export every line for external observation (read-only direction).
    #[serde(default = "default_true")]
    pub expose: bool,

    /// Edge on which button interrupts fire.
    #[serde(default)]
    pub edge: Edge,

    /// Logging and service identity.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Indicator units, in construction order.
    #[serde(default)]
    pub buzzers: Vec<BuzzerConfig>,

    /// The reset unit.
    pub reset: ResetConfig,

    /// Per-platform configuration sections.
    /// Key = platform name, Value = platform-specific TOML table.
    #[serde(default)]
    pub driver_config: HashMap<String, toml::Value>,
}

impl SystemConfig {
    /// Validate the system configuration.
    ///
    /// # Validation Rules
    /// 1. `shared` is valid (non-empty service name)
    /// 2. `platform` not empty
    /// 3. `buzzers.len()` <= MAX_BUZZERS
    /// 4. Every label is non-empty
    /// 5. No line number is used twice, across all roles
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.platform.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "platform cannot be empty".to_string(),
            ));
        }

        if self.buzzers.len() > MAX_BUZZERS {
            return Err(ConfigError::ValidationError(format!(
                "Too many buzzers: {} (max {})",
                self.buzzers.len(),
                MAX_BUZZERS
            )));
        }

        let mut owners: HashMap<LineId, &str> = HashMap::new();
        for line in self.lines() {
            if line.label.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{} has an empty label",
                    line.line
                )));
            }
            if let Some(previous) = owners.insert(line.line, &line.label) {
                return Err(ConfigError::ValidationError(format!(
                    "{} assigned twice ('{}' and '{}')",
                    line.line, previous, line.label
                )));
            }
        }

        Ok(())
    }

    /// All configured lines in construction order: each buzzer's button and
    /// LED, then the reset button.
    pub fn lines(&self) -> Vec<&LineConfig> {
        self.buzzers
            .iter()
            .flat_map(|b| [&b.button, &b.led])
            .chain(std::iter::once(&self.reset.button))
            .collect()
    }

    /// Platform-specific configuration table, if present.
    pub fn driver_section(&self, platform: &str) -> Option<&toml::Value> {
        self.driver_config.get(platform)
    }
}

impl Default for SystemConfig {
    /// Stock two-buzzer panel.
    fn default() -> Self {
        Self {
            platform: default_platform(),
            expose: true,
            edge: Edge::Falling,
            shared: SharedConfig::default(),
            buzzers: vec![
                BuzzerConfig {
                    button: LineConfig::new(27, "button 1"),
                    led: LineConfig::new(24, "led 1 (blue)"),
                },
                BuzzerConfig {
                    button: LineConfig::new(23, "button 2"),
                    led: LineConfig::new(25, "led 2 (red)"),
                },
            ],
            reset: ResetConfig {
                button: LineConfig::new(26, "reset button"),
            },
            driver_config: HashMap::new(),
        }
    }
}
