//! Structured logging for Hypatia.
//!
//! Logs are emitted with `tracing` macros throughout the workspace. This
//! module installs a `tracing-subscriber` registry with an [`EnvFilter`]
//! and either a JSON layer (production) or a pretty layer (development).
//!
//! # Example
//!
//! ```rust,no_run
//! use hypatia_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).unwrap();
//! tracing::info!(request_id = "0190…", "Processing request");
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g. `"info"`, `"hypatia_server=debug,info"`).
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            span_events: false,
            file_line_info: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            span_events: true,
            file_line_info: true,
            ..Self::default()
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Builds the [`EnvFilter`] for this configuration.
    pub fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        create_env_filter(&self.level)
    }
}

/// Initializes the global logging subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidConfig`] for a bad filter directive and
/// [`TelemetryError::LoggingInit`] when a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = config.env_filter()?;
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidConfig`] if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::InvalidConfig(format!("invalid log filter '{filter}': {e}")))
}

/// Standard log field names used across the workspace.
pub mod fields {
    /// Request ID field name.
    pub const REQUEST_ID: &str = "request_id";

    /// HTTP method field name.
    pub const HTTP_METHOD: &str = "http.method";

    /// HTTP path field name.
    pub const HTTP_PATH: &str = "http.path";

    /// HTTP status code field name.
    pub const HTTP_STATUS: &str = "http.status_code";

    /// Matched route pattern field name.
    pub const HTTP_ROUTE: &str = "http.route";

    /// Duration field name (in milliseconds).
    pub const DURATION_MS: &str = "duration_ms";

    /// Error field name.
    pub const ERROR: &str = "error";

    /// Workflow event field name.
    pub const WORKFLOW_EVENT: &str = "workflow.event";

    /// Workflow state field name.
    pub const WORKFLOW_STATE: &str = "workflow.state";
}

/// Logs a request completion event.
#[macro_export]
macro_rules! log_request_complete {
    ($request_id:expr, $method:expr, $path:expr, $status:expr, $duration_ms:expr) => {
        ::tracing::debug!(
            request_id = %$request_id,
            http.method = %$method,
            http.path = %$path,
            http.status_code = $status,
            duration_ms = $duration_ms,
            "Request completed"
        );
    };
}

/// Logs a request failure event.
#[macro_export]
macro_rules! log_request_error {
    ($request_id:expr, $method:expr, $path:expr, $error:expr) => {
        ::tracing::error!(
            request_id = %$request_id,
            http.method = %$method,
            http.path = %$path,
            error = %$error,
            "Request failed"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_json(f: impl FnOnce()) -> Vec<serde_json::Value> {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_default_is_production() {
        assert_eq!(LogConfig::default(), LogConfig::production());
        assert_eq!(LogConfig::production().format, LogFormat::Json);
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.span_events);
    }

    #[test]
    fn test_env_filter_validation() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("hypatia_server=debug,warn").is_ok());
        assert!(matches!(
            create_env_filter("hypatia=loud"),
            Err(TelemetryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_disabled_logging_is_noop() {
        let config = LogConfig {
            enabled: false,
            level: "not a [valid filter".to_string(),
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_log_format_serde() {
        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), r#""json""#);
    }

    #[test]
    fn test_request_macros_use_standard_fields() {
        let events = capture_json(|| {
            log_request_complete!("req-1", "GET", "/documents", 200u16, 1.5);
            log_request_error!("req-2", "POST", "/documents", "boom");
        });

        assert_eq!(events.len(), 2);
        let complete = &events[0]["fields"];
        assert_eq!(complete[fields::REQUEST_ID], "req-1");
        assert_eq!(complete[fields::HTTP_METHOD], "GET");
        assert_eq!(complete[fields::HTTP_PATH], "/documents");
        assert_eq!(complete[fields::HTTP_STATUS], 200);
        assert_eq!(complete[fields::DURATION_MS], 1.5);

        assert_eq!(events[1]["level"], "ERROR");
        assert_eq!(events[1]["fields"][fields::ERROR], "boom");
    }
}
