//! Platform registry.
//!
//! Maps platform names from `buzzer.toml` to factories. Built at startup
//! and passed to `BuzzerSystem::from_registry`.

use crate::error::SystemError;
use buzz_common::gpio::platform::{Platform, PlatformFactory};
use std::collections::HashMap;

/// Registry of available GPIO platforms.
pub struct PlatformRegistry {
    factories: HashMap<&'static str, PlatformFactory>,
}

impl PlatformRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with every built-in platform.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_all_platforms(&mut registry);
        registry
    }

    /// Register a platform factory.
    ///
    /// # Panics
    /// Panics if a platform with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: PlatformFactory) {
        if self.factories.contains_key(name) {
            panic!("Platform '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a platform factory by name.
    pub fn get_factory(&self, name: &str) -> Option<PlatformFactory> {
        self.factories.get(name).copied()
    }

    /// Create an uninitialized platform instance by name.
    ///
    /// # Errors
    /// Returns `SystemError::PlatformNotFound` for unknown names.
    pub fn create_platform(&self, name: &str) -> Result<Box<dyn Platform>, SystemError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| SystemError::PlatformNotFound(name.to_string()))?;
        Ok(factory())
    }

    /// List all registered platform names.
    pub fn list_platforms(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}
