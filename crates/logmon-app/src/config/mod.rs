//! Configuration file parsing for logcat-monitor
//!
//! Supports:
//! - `<config_dir>/logcat-monitor/config.toml` - Global settings
//! - `LOGMON_CONFIG` - Alternate settings file

pub mod settings;
pub mod types;

pub use settings::{
    config_path, default_config_path, load_settings, resolve_settings, CONFIG_ENV_VAR,
};
pub use types::*;
