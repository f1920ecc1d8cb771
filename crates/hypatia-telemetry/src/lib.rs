//! # Hypatia Telemetry
//!
//! Logging setup for services built on the Hypatia kernel.
//!
//! Every crate in the workspace logs through `tracing` with the structured
//! field names in [`fields`]. Applications call [`init_logging`] once at
//! startup with a [`LogConfig`], usually derived from the `logging` section
//! of the service configuration.

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
