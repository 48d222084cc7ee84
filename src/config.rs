//! This module provides functionality for loading and handling the application's configuration.
//!
//! It defines the `JournalConfig` struct, which holds the configuration parameters,
//! a `load_config` function to load the configuration from a YAML file, and
//! `resolve_api_key` to pull the API credential out of the environment.
//!
//! Every field has a default, so a partial file (or no file at all) is fine.
//! The API key is never stored in the YAML file; it is read from the environment
//! variable named by `api_key_env`, after an optional `.env` file has been loaded.
//!
//! # Examples
//!
//! ```no_run
//! use synth_journal::config::{JournalConfig, load_config};
//! use std::path::Path;
//!
//! let config: JournalConfig = load_config(Path::new("/path/to/config.yaml")).unwrap();
//! println!("{:?}", config);
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::text::DEFAULT_TOLERANCE;

/// Represents the application's configuration.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct JournalConfig {
    /// The base URL of the OpenAI compatible API.
    pub api_base: String,

    /// The name of the model used to write entries.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Accepted word count deviation, as a fraction of the target.
    pub tolerance: f64,

    // The context size of the model.
    pub context_max_tokens: u32,

    // Seed dataset used for few-shot examples
    pub dataset_path: PathBuf,

    // Consecutive export failures tolerated before a run is aborted
    pub max_consecutive_export_failures: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.7,
            tolerance: DEFAULT_TOLERANCE,
            context_max_tokens: 8192,
            dataset_path: PathBuf::from("data/data.csv"),
            max_consecutive_export_failures: 3,
        }
    }
}

impl JournalConfig {
    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tolerance(self.tolerance)
    }
}

/// Tolerance is a fraction of the target and must lie in `[0, 1]`.
pub fn validate_tolerance(tolerance: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&tolerance) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTolerance(tolerance))
    }
}

/// Loads the application's configuration from a YAML file.
///
/// # Errors
///
/// [`ConfigError::Read`] if the file cannot be read, [`ConfigError::Parse`] if it is
/// not valid YAML for [`JournalConfig`].
pub fn load_config(file: &Path) -> Result<JournalConfig, ConfigError> {
    debug!("Loading config: {}", file.display());
    let content = fs::read_to_string(file).map_err(|source| ConfigError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    let config: JournalConfig =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: file.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

/// Resolve the configuration for a run.
///
/// An explicit path must exist. Without one, `<config_dir>/config.yaml` is used when
/// present and the defaults otherwise.
pub fn resolve_config(explicit: Option<&Path>) -> Result<JournalConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    let default_path = crate::config_dir()?.join("config.yaml");
    if default_path.is_file() {
        load_config(&default_path)
    } else {
        info!(
            "No config file at {}, using defaults",
            default_path.display()
        );
        Ok(JournalConfig::default())
    }
}

/// Read the API key named by `var` from the process environment.
///
/// A `.env` file in the working directory is loaded first if there is one; variables
/// already set in the environment win over the file.
pub fn resolve_api_key(var: &str) -> Result<String, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }
    api_key_from(var, |name| env::var(name).ok())
}

/// Credential lookup against an arbitrary variable source.
pub fn api_key_from<F>(var: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::MissingCredential {
            var: var.to_string(),
        })
}
