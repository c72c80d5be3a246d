// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// This module handles loading and parsing configuration from config.toml.
// Provides sensible defaults if config file is missing or has errors.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::backend::selection::{FirstMatch, PreferDiscrete, SelectionPolicy};

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub instance: InstanceConfig,
    pub device: DeviceConfig,
    pub debug: DebugConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "test".to_string(),
            width: 640,
            height: 480,
        }
    }
}

/// Instance settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    pub application_name: String,
    /// Instance extensions to enable. Empty means "ask the window system".
    pub extensions: Vec<String>,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            application_name: "vk-bringup".to_string(),
            extensions: Vec::new(),
        }
    }
}

/// How a physical device is picked
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DevicePolicy {
    #[default]
    FirstMatch,
    PreferDiscrete,
}

/// Device settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub policy: DevicePolicy,
    pub min_queue_count: u32,
    pub queue_priority: f32,
    pub require_depth_stencil: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            policy: DevicePolicy::FirstMatch,
            min_queue_count: 1,
            queue_priority: 0.0,
            require_depth_stencil: true,
        }
    }
}

impl DeviceConfig {
    pub fn selection_policy(&self) -> Box<dyn SelectionPolicy> {
        let min_queue_count = self.min_queue_count.max(1);
        match self.policy {
            DevicePolicy::FirstMatch => Box::new(FirstMatch { min_queue_count }),
            DevicePolicy::PreferDiscrete => Box::new(PreferDiscrete { min_queue_count }),
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub validation_layers: bool,
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load config.toml, falling back to defaults.
    ///
    /// Runs before logging is up, so a load failure is handed back for the
    /// caller to report instead of being logged here.
    pub fn load() -> (Self, Option<anyhow::Error>) {
        Self::load_or_default("config.toml")
    }

    /// Load from `path`; on failure return the defaults together with the error
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> (Self, Option<anyhow::Error>) {
        match Self::load_from_path(path) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        }
    }

    /// Load configuration from a specific path. A missing file gives defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Configured log level, or the unparseable string
    pub fn log_level(&self) -> Result<log::LevelFilter, &str> {
        self.debug
            .log_level
            .parse()
            .map_err(|_| self.debug.log_level.as_str())
    }
}
