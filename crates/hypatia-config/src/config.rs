//! The root configuration type.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::{DispatcherConfig, LoggingConfig, ResponseConfig, RouterConfig};
use hypatia_telemetry::{create_env_filter, LogFormat};

/// Complete Hypatia configuration.
///
/// # Example
///
/// ```
/// use hypatia_config::HypatiaConfig;
///
/// let config = HypatiaConfig::default();
/// assert!(!config.dispatcher.trust_request_id);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HypatiaConfig {
    /// Router settings.
    #[serde(default)]
    pub router: RouterConfig,

    /// Response builder settings.
    #[serde(default)]
    pub response: ResponseConfig,

    /// Dispatcher settings.
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HypatiaConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the log level is empty or not
    /// a valid filter directive, or the body limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }
        if let Err(e) = create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", e.to_string()));
        }
        if self.dispatcher.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "dispatcher.max_body_bytes",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Development preset: pretty debug logs, pretty JSON.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.response.pretty_json = true;
        config
    }

    /// Production preset: JSON logs at info, duplicate routes rejected.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.router.duplicate_routes = crate::DuplicateRoutePolicy::Reject;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DuplicateRoutePolicy;

    #[test]
    fn test_default_is_valid() {
        assert!(HypatiaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let dev = HypatiaConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert!(dev.response.pretty_json);
        assert!(dev.validate().is_ok());

        let prod = HypatiaConfig::production();
        assert_eq!(prod.router.duplicate_routes, DuplicateRoutePolicy::Reject);
        assert!(prod.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = HypatiaConfig::default();
        config.logging.level = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "logging.level"
        ));

        let mut config = HypatiaConfig::default();
        config.dispatcher.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<HypatiaConfig, _> = toml::from_str("[router]\nstrict = true\n");
        assert!(result.is_err());

        let result: Result<HypatiaConfig, _> = toml::from_str("[server]\nport = 1\n");
        assert!(result.is_err());
    }
}
