//! Configuration loading for the content model service
//!
//! Configuration is read from YAML files with environment variable
//! substitution (`${VAR}` or `${VAR:-default}`).

use content_model_core::config::ContentModelConfig;
use content_model_core::error::{ContentModelError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::debug;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

/// Environment variable naming an alternative configuration file
pub const CONFIG_ENV_VAR: &str = "CMM_CONFIG";

static ENV_VAR_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::(-)?([^}]*))?\}").ok());

/// Load configuration from a `YAML` file with environment variable substitution
///
/// # Errors
///
/// Returns `IoError` if the file cannot be read
/// Returns `ConfigError` if the YAML cannot be parsed
pub fn load_config<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path).map_err(ContentModelError::IoError)?;
    let substituted = substitute_env_vars(&contents);

    serde_yaml::from_str(&substituted).map_err(|e| {
        ContentModelError::config(format!(
            "Failed to parse YAML config {}: {e}",
            path.display()
        ))
    })
}

/// Load and validate the service configuration
///
/// An explicit `path` wins, then `$CMM_CONFIG`, then
/// [`DEFAULT_CONFIG_PATH`] if it exists. With none of them the built-in
/// defaults are used.
///
/// # Errors
///
/// Returns `IoError` or `ConfigError` if a chosen file cannot be loaded, and
/// `ConfigError` if the result fails validation.
pub fn load_content_model_config(path: Option<&Path>) -> Result<ContentModelConfig> {
    let from_env = env::var(CONFIG_ENV_VAR).ok();
    let chosen = path
        .map(Path::to_path_buf)
        .or_else(|| from_env.map(Into::into))
        .or_else(|| {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            default.is_file().then(|| default.to_path_buf())
        });

    let config = match chosen {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration");
            load_config::<ContentModelConfig>(&path)?
        }
        None => {
            debug!("No configuration file found, using defaults");
            ContentModelConfig::default()
        }
    };

    config.validate()?;
    Ok(config)
}

/// Substitute environment variables in the format `${VAR:-default}`
fn substitute_env_vars(content: &str) -> String {
    let Some(re) = ENV_VAR_PATTERN.as_ref() else {
        return content.to_string();
    };

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default_value = caps.get(3).map_or("", |m| m.as_str());

        env::var(var_name).unwrap_or_else(|_| default_value.to_string())
    })
    .to_string()
}
