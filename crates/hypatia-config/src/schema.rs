//! Configuration sections.

use hypatia_core::DEFAULT_MAX_BODY_BYTES;
use hypatia_response::MediaType;
use hypatia_router::DuplicatePolicy;
use hypatia_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

/// What happens when a static route is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateRoutePolicy {
    /// The later registration wins.
    #[default]
    Overwrite,
    /// The later registration is an error.
    Reject,
}

impl From<DuplicateRoutePolicy> for DuplicatePolicy {
    fn from(policy: DuplicateRoutePolicy) -> Self {
        match policy {
            DuplicateRoutePolicy::Overwrite => Self::Overwrite,
            DuplicateRoutePolicy::Reject => Self::Reject,
        }
    }
}

/// Router settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RouterConfig {
    /// Policy for duplicate static routes.
    pub duplicate_routes: DuplicateRoutePolicy,
}

/// Response builder settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ResponseConfig {
    /// Representation used when the client has no preference.
    pub default_media_type: MediaType,
    /// Pretty-print JSON bodies.
    pub pretty_json: bool,
}

/// Dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DispatcherConfig {
    /// Honour a well-formed incoming `x-request-id` header.
    pub trust_request_id: bool,
    /// Bodies above this size are recorded as a validation error.
    pub max_body_bytes: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            trust_request_id: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Filter directive.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        let base = match config.format {
            LogFormat::Json => Self::production(),
            LogFormat::Pretty => Self::development(),
        };
        Self {
            level: config.level.clone(),
            format: config.format,
            ..base
        }
    }
}
