//! Configuration module.
//!
//! Handles the TOML settings file and environment variable overrides.

mod settings;

pub use settings::{
    expand_env_vars, CubeSettings, LoggingSettings, LookerSettings, ManifestSettings, Settings,
    SettingsError, CONFIG_ENV_VAR,
};
