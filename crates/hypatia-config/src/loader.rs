//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use hypatia_response::MediaType;
use hypatia_telemetry::LogFormat;

use crate::{ConfigError, DuplicateRoutePolicy, HypatiaConfig};

/// Supported configuration formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML.
    Toml,
    /// JSON.
    Json,
}

impl ConfigFormat {
    /// Resolves a format from a name or file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for anything but `toml` or `json`.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    fn parse(self, content: &str) -> Result<HypatiaConfig, ConfigError> {
        Ok(match self {
            Self::Toml => toml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        })
    }
}

/// Builds a [`HypatiaConfig`] from defaults, a file and environment variables.
///
/// Later layers override earlier ones. A file replaces the whole
/// configuration; sections it omits take their defaults.
///
/// # Example
///
/// ```no_run
/// use hypatia_config::ConfigLoader;
///
/// # fn main() -> Result<(), hypatia_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("hypatia.toml")?
///     .with_env_prefix("HYPATIA")
///     .load()?;
/// # let _ = config;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: HypatiaConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Creates a loader seeded with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to the default configuration.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = HypatiaConfig::default();
        self
    }

    /// Resets to the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HypatiaConfig::development();
        self
    }

    /// Resets to the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HypatiaConfig::production();
        self
    }

    /// Loads a `.toml` or `.json` file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing, unreadable, has an unknown extension,
    /// or does not parse (unknown fields included).
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or_else(
                || Err(ConfigError::UnsupportedFormat(path.display().to_string())),
                ConfigFormat::from_name,
            )?;
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = format.parse(&content)?;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file) but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in the named format.
    ///
    /// ```
    /// use hypatia_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_str("[dispatcher]\ntrust_request_id = true\n", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.dispatcher.trust_request_id);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on an unknown format or a parse error.
    pub fn with_str(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = ConfigFormat::from_name(format)?.parse(content)?;
        Ok(self)
    }

    /// Enables `PREFIX__SECTION__KEY` environment overrides, applied by [`load`](Self::load).
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Fails when an override cannot be parsed or validation fails.
    pub fn load(mut self) -> Result<HypatiaConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let marker = format!("{prefix}__");
            for (key, value) in env::vars().filter(|(k, _)| k.starts_with(&marker)) {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }
        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without env overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> HypatiaConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let rest = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;
        let parts: Vec<&str> = rest.split("__").collect();

        match parts.as_slice() {
            ["ROUTER", "DUPLICATE_ROUTES"] => {
                self.config.router.duplicate_routes = match value.to_lowercase().as_str() {
                    "overwrite" => DuplicateRoutePolicy::Overwrite,
                    "reject" => DuplicateRoutePolicy::Reject,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'overwrite' or 'reject'",
                        ))
                    }
                };
            }
            ["RESPONSE", "DEFAULT_MEDIA_TYPE"] => {
                self.config.response.default_media_type = value
                    .parse::<MediaType>()
                    .map_err(|e| ConfigError::env_parse_error(key, e.to_string()))?;
            }
            ["RESPONSE", "PRETTY_JSON"] => {
                self.config.response.pretty_json = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["DISPATCHER", "TRUST_REQUEST_ID"] => {
                self.config.dispatcher.trust_request_id = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["DISPATCHER", "MAX_BODY_BYTES"] => {
                self.config.dispatcher.max_body_bytes = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            // unknown keys are ignored
            _ => {}
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
