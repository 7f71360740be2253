//! Configuration management for switchcut.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use switchcut_core::config::{ConfigManager, ConfigSection};
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".switchcut/settings.toml");
//! config.load_or_create().unwrap();
//!
//! // Read settings
//! println!("Temp root: {}", config.settings().paths.temp_root);
//!
//! // Modify a setting
//! config.settings_mut().pipeline.max_parallel_trims = 4;
//!
//! // Save just the pipeline section atomically
//! config.update_section(ConfigSection::Pipeline).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, EncodingSettings, LoggingSettings, PathSettings, PipelineSettings, Settings,
};
