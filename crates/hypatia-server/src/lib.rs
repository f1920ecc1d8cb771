//! # Hypatia Server
//!
//! The application surface of the Hypatia request kernel.
//!
//! [`App`] collects global middleware, routes, the workflow definition and
//! an optional HTML renderer. [`App::build`] freezes them into a
//! [`Dispatcher`], which turns `http::Request` values into responses:
//!
//! 1. build the [`Context`](hypatia_core::Context)
//! 2. run the middleware pipeline with route resolution as its last step
//! 3. return the response a middleware or handler set, `404` on a routing
//!    miss, or `204` when nothing answered
//!
//! Errors and panics are caught once at the dispatcher and rendered as an
//! error envelope carrying the request id.
//!
//! There is no socket server here; feed the dispatcher from whatever
//! transport you run.

#![doc(html_root_url = "https://docs.rs/hypatia-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod dispatcher;
mod endpoint;
mod workflow;

pub use app::App;
pub use dispatcher::Dispatcher;
pub use workflow::ContextWorkflowExt;
