//! TOML-based configuration for mf-translate.
//!
//! Supports a config file (mf-translate.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [manifest]
//! dir = "${DBT_PROJECT_DIR}/target"
//! semantic_manifest = "semantic_manifest.json"
//! build_manifest = "manifest.json"
//!
//! [logging]
//! level = "info"
//!
//! [cube]
//! timezone = "America/Los_Angeles"
//! target_database = "bigquery"
//! filter_style = "case_when"
//!
//! [looker]
//! model = "jaffle_shop"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assemble::{AssembleOptions, TargetDatabase, TimezoneConversion};
use crate::compose::FilterStyle;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "MF_TRANSLATE_CONFIG";

/// Environment variables overriding individual settings.
const ENV_MANIFEST_DIR: &str = "MF_TRANSLATE__DBT_MANIFEST_DIR";
const ENV_CUBE_TIMEZONE: &str = "MF_TRANSLATE_TO_CUBE__TIMEZONE_FOR_TIME_DIMENSIONS";
const ENV_TARGET_DATABASE: &str = "MF_TRANSLATE__TARGET_DATABASE";
const ENV_LOOKER_MODEL: &str = "MF_TRANSLATE_LOOKER_MODEL";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Where the dbt manifests live.
    pub manifest: ManifestSettings,

    /// Log verbosity.
    pub logging: LoggingSettings,

    /// Cube output.
    pub cube: CubeSettings,

    /// Looker query translation.
    pub looker: LookerSettings,
}

/// Manifest location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ManifestSettings {
    /// dbt `target/` directory (supports ${ENV_VAR} expansion).
    pub dir: String,

    /// MetricFlow semantic manifest file name.
    pub semantic_manifest: String,

    /// dbt build manifest file name; optional on disk.
    pub build_manifest: String,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        Self {
            dir: "target".to_string(),
            semantic_manifest: "semantic_manifest.json".to_string(),
            build_manifest: "manifest.json".to_string(),
        }
    }
}

impl ManifestSettings {
    /// Get the manifest directory with environment variables expanded.
    pub fn resolved_dir(&self) -> Result<PathBuf, SettingsError> {
        Ok(PathBuf::from(expand_env_vars(&self.dir)?))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset (e.g. "info", "mf_translate=debug").
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Cube configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CubeSettings {
    /// Time zone time dimensions are converted to.
    pub timezone: Option<String>,

    /// Warehouse dialect used for the time zone conversion (bigquery, snowflake).
    pub target_database: Option<String>,

    /// How metric filters are expressed.
    pub filter_style: FilterStyle,
}

impl CubeSettings {
    /// The configured time zone conversion.
    ///
    /// A time zone without a target database cannot be applied and is ignored.
    pub fn timezone_conversion(&self) -> Result<Option<TimezoneConversion>, SettingsError> {
        let Some(timezone) = self.timezone.as_deref().filter(|tz| !tz.is_empty()) else {
            return Ok(None);
        };
        let Some(database) = self.target_database.as_deref() else {
            tracing::warn!(timezone, "cube timezone set without target_database; ignoring it");
            return Ok(None);
        };
        let database: TargetDatabase = database.parse().map_err(SettingsError::InvalidConfig)?;
        Ok(Some(TimezoneConversion::new(timezone, database)))
    }
}

/// Looker configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LookerSettings {
    /// Looker model the generated views are part of.
    pub model: Option<String>,
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load settings from the default config file locations, then apply
    /// environment overrides.
    ///
    /// Searches in order:
    /// 1. Environment variable `MF_TRANSLATE_CONFIG`
    /// 2. `./mf-translate.toml`
    /// 3. `~/.config/mf-translate/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = Self::load_file()?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    fn load_file() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("mf-translate.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("mf-translate").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(dir) = get(ENV_MANIFEST_DIR) {
            self.manifest.dir = dir;
        }
        if let Some(timezone) = get(ENV_CUBE_TIMEZONE) {
            self.cube.timezone = Some(timezone);
        }
        if let Some(database) = get(ENV_TARGET_DATABASE) {
            self.cube.target_database = Some(database);
        }
        if let Some(model) = get(ENV_LOOKER_MODEL) {
            self.looker.model = Some(model);
        }
    }

    /// Assembly options implied by these settings.
    pub fn assemble_options(&self) -> Result<AssembleOptions, SettingsError> {
        let mut options = AssembleOptions::default().with_filter_style(self.cube.filter_style);
        if let Some(timezone) = self.cube.timezone_conversion()? {
            options = options.with_timezone(timezone);
        }
        Ok(options)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                var_name.push(ch);
            }
            if !closed {
                return Err(SettingsError::InvalidConfig(format!(
                    "unterminated variable reference in '{s}'"
                )));
            }
        } else {
            // $VAR ends at the first non-identifier character
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
