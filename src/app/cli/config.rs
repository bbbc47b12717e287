//! TOML configuration file parsing and loading
//!
//! Values from the file only fill options that were not given on the
//! command line.

use super::args::Args;
use crate::core::validation::{validate_base_url, ValidationError};
use crate::lookup::api::BackendKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_DIR_NAME: &str = "Barscan";
const CONFIG_FILE_NAME: &str = "barscan.toml";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("Error reading configuration file {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("Error parsing configuration file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ConfigError {
    fn from(error: ValidationError) -> Self {
        ConfigError::InvalidValue {
            key: "base-url".to_string(),
            message: error.message().to_string(),
        }
    }
}

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ConfigError::InvalidValue { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidValue { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// `<config_dir>/Barscan/barscan.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl Args {
    /// Load the config file (explicit or default) and merge it into `args`
    ///
    /// Returns the path that was loaded, if any. An explicit `--config-file`
    /// must exist; a missing default file is not an error.
    pub async fn load_config_file(
        args: &mut Self,
        config_file: Option<PathBuf>,
    ) -> Result<Option<PathBuf>, ConfigError> {
        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Missing { path });
                }
                path
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(None),
            },
        };

        let config = read_config(&config_path).await?;
        Self::apply_toml_values(args, &config)?;
        log::debug!("Loaded configuration from {}", config_path.display());
        Ok(Some(config_path))
    }

    /// Apply TOML configuration values to Args where the command line left them unset
    pub fn apply_toml_values(args: &mut Self, config: &toml::Table) -> Result<(), ConfigError> {
        if let Some(backend) = string_value(config, "backend")? {
            BackendKind::from_str(&backend).map_err(|_| {
                ConfigError::invalid(
                    "backend",
                    format!(
                        "unknown backend '{}', expected one of: {}",
                        backend,
                        BackendKind::variants()
                    ),
                )
            })?;
            args.backend.get_or_insert(backend);
        }
        if let Some(base_url) = string_value(config, "base-url")? {
            validate_base_url(&base_url)?;
            args.base_url.get_or_insert(base_url);
        }
        if let Some(api_key) = string_value(config, "api-key")? {
            args.api_key.get_or_insert(api_key);
        }
        if let Some(api_host) = string_value(config, "api-host")? {
            args.api_host.get_or_insert(api_host);
        }
        if let Some(timeout) = positive_value(config, "timeout-secs")? {
            args.timeout_secs.get_or_insert(timeout);
        }
        if let Some(retries) = non_negative_value(config, "retries")? {
            args.retries.get_or_insert(retries);
        }
        if let Some(history_size) = positive_value(config, "history-size")? {
            args.history_size.get_or_insert(history_size);
        }
        if let Some(dump_dir) = string_value(config, "dump-dir")? {
            args.dump_dir.get_or_insert_with(|| PathBuf::from(dump_dir));
        }
        if let Some(merge) = bool_value(config, "merge-not-found")? {
            args.merge_not_found |= merge;
        }

        // Either flag on the command line decides colour on its own
        if !args.color && !args.no_color {
            if let Some(color) = bool_value(config, "color")? {
                args.color = color;
            }
            if let Some(no_color) = bool_value(config, "no-color")? {
                args.no_color = no_color;
                if no_color {
                    args.color = false;
                }
            }
        }

        if let Some(log_level) = string_value(config, "log-level")? {
            args.log_level.get_or_insert(log_level);
        }
        if let Some(log_file) = string_value(config, "log-file")? {
            // Magic values "none" and "-" disable file logging
            if args.log_file.is_none()
                && !(log_file.eq_ignore_ascii_case("none") || log_file == "-")
            {
                args.log_file = Some(PathBuf::from(log_file));
            }
        }
        if let Some(log_format) = string_value(config, "log-format")? {
            args.log_format.get_or_insert(log_format);
        }

        Ok(())
    }
}

async fn read_config(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    toml::from_str::<toml::Table>(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn string_value(config: &toml::Table, key: &str) -> Result<Option<String>, ConfigError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ConfigError::invalid(key, format!("{key} must be a string"))),
    }
}

fn bool_value(config: &toml::Table, key: &str) -> Result<Option<bool>, ConfigError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| ConfigError::invalid(key, format!("{key} must be true or false"))),
    }
}

fn non_negative_value(config: &toml::Table, key: &str) -> Result<Option<usize>, ConfigError> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => match value.as_integer() {
            Some(n) if n >= 0 => Ok(Some(n as usize)),
            _ => Err(ConfigError::invalid(
                key,
                format!("{key} must be a non-negative integer"),
            )),
        },
    }
}

fn positive_value(config: &toml::Table, key: &str) -> Result<Option<usize>, ConfigError> {
    match non_negative_value(config, key) {
        Ok(Some(0)) | Err(_) => Err(ConfigError::invalid(
            key,
            format!("{key} must be a positive integer"),
        )),
        other => other,
    }
}
