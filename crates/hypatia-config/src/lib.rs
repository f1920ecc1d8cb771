//! # Hypatia Config
//!
//! Typed configuration for the Hypatia request kernel.
//!
//! Values are layered: built-in defaults, then an optional TOML or JSON
//! file, then `PREFIX__SECTION__KEY` environment variables. Unknown fields
//! in files are rejected.
//!
//! ```toml
//! [router]
//! duplicate_routes = "reject"
//!
//! [response]
//! default_media_type = "application/hal+json"
//! pretty_json = false
//!
//! [dispatcher]
//! trust_request_id = true
//! max_body_bytes = 1048576
//!
//! [logging]
//! level = "info,hypatia=debug"
//! format = "json"
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::HypatiaConfig;
pub use error::ConfigError;
pub use loader::{ConfigFormat, ConfigLoader};
pub use schema::{
    DispatcherConfig, DuplicateRoutePolicy, LoggingConfig, ResponseConfig, RouterConfig,
};
