//! Buzzer system orchestration.
//!
//! `BuzzerSystem` owns the platform handle, the shared latch and every unit.
//! `init` builds the units in configuration order and rolls back completely
//! on the first failure; `teardown` releases them in reverse.

use crate::buzzer::IndicatorUnit;
use crate::error::{SystemError, UnitId};
use crate::latch::SharedLatch;
use crate::platform_registry::PlatformRegistry;
use crate::reset::{LedRefs, ResetUnit};
use buzz_common::config::ConfigLoader;
use buzz_common::gpio::config::SystemConfig;
use buzz_common::gpio::platform::Platform;
use buzz_common::gpio::types::LineId;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

/// The running buzzer panel.
pub struct BuzzerSystem {
    /// Validated configuration
    config: SystemConfig,
    /// GPIO controller
    platform: Arc<dyn Platform>,
    /// Latch shared by every unit
    latch: Arc<SharedLatch>,
    /// Indicator units, in construction order
    buzzers: Vec<IndicatorUnit>,
    /// Reset unit, built last
    reset: Option<ResetUnit>,
    /// Set between a successful `init` and `teardown`
    active: bool,
}

impl BuzzerSystem {
    /// Create a system over an initialized platform.
    ///
    /// # Errors
    /// Returns `SystemError::Config` if the configuration is invalid.
    pub fn new(config: SystemConfig, platform: Arc<dyn Platform>) -> Result<Self, SystemError> {
        config.validate()?;

        info!(
            "BuzzerSystem created: {} buzzers on platform '{}' v{}",
            config.buzzers.len(),
            platform.name(),
            platform.version()
        );

        Ok(Self {
            config,
            platform,
            latch: Arc::new(SharedLatch::new()),
            buzzers: Vec::new(),
            reset: None,
            active: false,
        })
    }

    /// Create the platform named by `config.platform`, initialize it and
    /// build a system over it.
    ///
    /// # Errors
    /// `PlatformNotFound`, `Platform` if the platform rejects its section,
    /// or `Config`.
    pub fn from_registry(
        config: SystemConfig,
        registry: &PlatformRegistry,
    ) -> Result<Self, SystemError> {
        config.validate()?;

        let mut platform = registry.create_platform(&config.platform)?;
        platform.init(&config)?;
        debug!("Platform '{}' initialized", platform.name());

        Self::new(config, Arc::from(platform))
    }

    /// Load a system configuration from a TOML file.
    pub fn load_config(path: &Path) -> Result<SystemConfig, SystemError> {
        info!("Loading configuration from {}", path.display());
        let config = SystemConfig::load(path)?;
        config.validate()?;
        info!(
            "Loaded config: platform={}, {} buzzers",
            config.platform,
            config.buzzers.len()
        );
        Ok(config)
    }

    /// Bring every unit up.
    ///
    /// Clears the latch, builds each indicator unit in order, then the reset
    /// unit over their LEDs. If any unit fails, every unit already built is
    /// released in reverse order and nothing stays acquired.
    ///
    /// # Errors
    /// `SystemError::Unit` naming the failing unit, or `AlreadyActive`.
    pub fn init(&mut self) -> Result<(), SystemError> {
        if self.active {
            return Err(SystemError::AlreadyActive);
        }
        info!("Initializing buzzer system...");
        self.latch.clear();

        if let Err(err) = self.build_units() {
            error!("Initialization failed, rolling back: {}", err);
            self.release_units();
            return Err(err);
        }

        self.active = true;
        info!(
            "Buzzer system ready: {} buzzers, reset on {}",
            self.buzzers.len(),
            self.config.reset.button.line
        );
        Ok(())
    }

    fn build_units(&mut self) -> Result<(), SystemError> {
        let expose = self.config.expose;
        let edge = self.config.edge;

        for (idx, buzzer) in self.config.buzzers.iter().enumerate() {
            let unit = IndicatorUnit::init(
                &self.platform,
                buzzer,
                Arc::clone(&self.latch),
                expose,
                edge,
            )
            .map_err(|source| SystemError::Unit {
                unit: UnitId::Buzzer(idx),
                source,
            })?;
            self.buzzers.push(unit);
        }

        // Length bounded by MAX_BUZZERS through `SystemConfig::validate`.
        let leds: LedRefs = self.buzzers.iter().map(|b| Some(b.led_ref())).collect();
        let reset = ResetUnit::init(
            &self.platform,
            &self.config.reset,
            leds,
            Arc::clone(&self.latch),
            expose,
            edge,
        )
        .map_err(|source| SystemError::Unit {
            unit: UnitId::Reset,
            source,
        })?;
        self.reset = Some(reset);
        Ok(())
    }

    /// Reset unit first, then indicator units newest to oldest.
    fn release_units(&mut self) {
        if let Some(mut reset) = self.reset.take() {
            reset.release();
        }
        while let Some(mut buzzer) = self.buzzers.pop() {
            debug!("Releasing buzzer '{}'", buzzer.button().label());
            buzzer.release();
        }
    }

    /// Release everything `init` acquired.
    ///
    /// Safe to call any number of times, including after a failed `init`.
    pub fn teardown(&mut self) {
        if !self.active && self.reset.is_none() && self.buzzers.is_empty() {
            return;
        }
        info!("Tearing down buzzer system");
        self.release_units();
        self.active = false;
    }

    /// Whether `init` succeeded and `teardown` has not run.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The shared latch.
    pub fn latch(&self) -> &Arc<SharedLatch> {
        &self.latch
    }

    /// The GPIO controller.
    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    /// The configuration in use.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Number of live indicator units.
    pub fn buzzer_count(&self) -> usize {
        self.buzzers.len()
    }

    /// Live indicator units, in construction order.
    pub fn buzzers(&self) -> &[IndicatorUnit] {
        &self.buzzers
    }

    /// Each LED line with whether it is lit.
    pub fn led_levels(&self) -> Vec<(LineId, bool)> {
        self.buzzers
            .iter()
            .map(|b| (b.led().id(), b.led().is_asserted()))
            .collect()
    }

    /// Index of the buzzer that won the current round, if any.
    pub fn winner(&self) -> Option<usize> {
        self.buzzers.iter().position(IndicatorUnit::is_winner)
    }
}

impl Drop for BuzzerSystem {
    fn drop(&mut self) {
        self.teardown();
    }
}
