//! # Hypatia Core
//!
//! Core types for the Hypatia request-processing kernel.
//!
//! - [`Context`] - Per-request carrier of request data, validation results,
//!   mutable response status/headers/state and the eventual response
//! - [`ContextBuilder`] - Turns a raw request into a [`Context`]
//! - [`Schema`] / [`Validation`] - The validator adapter
//! - [`Handler`] - The terminal request step
//! - [`KernelError`] - Error taxonomy and JSON error envelope
//!
//! ## Data flow
//!
//! ```text
//! Request ─► ContextBuilder ─► Context ─► middleware ─► Handler ─► Context.response
//!              │
//!              └─ validated.{query, headers, body, params}
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod context;
mod error;
mod handler;
mod types;
mod validation;

pub use builder::{ContextBuilder, DEFAULT_MAX_BODY_BYTES};
pub use context::{Context, RequestId, Validated, REQUEST_ID_HEADER};
pub use error::{
    ErrorCategory, ErrorDetail, ErrorEnvelope, KernelError, KernelResult, INTERNAL_ERROR_MESSAGE,
};
pub use handler::{handler_fn, BoxFuture, BoxedHandler, FnHandler, Handler};
pub use types::{Request, Response, ResponseExt};
pub use validation::{
    string_map_to_value, validate, FnSchema, JsonSchema, Schema, StringMap, StringMapSchema,
    Validation,
};
