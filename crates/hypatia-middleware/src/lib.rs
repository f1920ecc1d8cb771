//! # Hypatia Middleware
//!
//! Middleware composition for the Hypatia request kernel.
//!
//! A middleware is an async step that receives the request
//! [`Context`](hypatia_core::Context) and a [`Next`] continuation. The
//! [`Pipeline`] folds an ordered list of middleware around a terminal
//! [`Handler`](hypatia_core::Handler), right to left, so the first stage
//! added runs first and wraps everything after it.
//!
//! Short-circuiting is done by not calling [`Next::run`]: later stages and
//! the handler are skipped. Because `run` consumes `Next`, the chain cannot
//! be continued twice.
//!
//! ## Built-in stages
//!
//! | Stage | Purpose |
//! |-------|---------|
//! | [`RequestIdMiddleware`] | echo the correlation id as `x-request-id` |
//! | [`RequestLogMiddleware`] | structured completion log with timing |
//!
//! ## Example
//!
//! ```
//! use hypatia_middleware::{Pipeline, RequestIdMiddleware, RequestLogMiddleware};
//!
//! let pipeline = Pipeline::builder()
//!     .add(RequestIdMiddleware::new())
//!     .add(RequestLogMiddleware::new())
//!     .build();
//!
//! assert_eq!(pipeline.stage_names(), vec!["request_id", "request_log"]);
//! ```

pub mod middleware;
pub mod pipeline;
pub mod stages;

pub use middleware::{middleware_fn, FnMiddleware, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder};
pub use stages::{RequestIdMiddleware, RequestLogMiddleware};
