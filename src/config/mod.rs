//! Configuration module for Kestrel.
//!
//! Handles the TOML settings file, environment variable expansion, and eager
//! validation.

mod settings;

pub use settings::{
    expand_env_vars, DetectorSettings, RunSettings, Settings, SettingsError, StoreSettings,
};
