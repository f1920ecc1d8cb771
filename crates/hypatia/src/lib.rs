//! # Hypatia
//!
//! A request-processing kernel for hypermedia HTTP APIs.
//!
//! An incoming `http::Request` becomes a [`Context`](core::Context) with
//! validated query, headers and body, flows through a middleware
//! pipeline, is routed through a two-tier router (exact static table,
//! then patterns in registration order), may drive a finite-state
//! workflow, and leaves as a content-negotiated JSON, HAL+JSON or HTML
//! response.
//!
//! ```text
//! Request ─► ContextBuilder ─► middleware ... ─► Router ─► handler
//!                                                            │
//!                      WorkflowEngine ◄──────────────────────┤
//!                                                            ▼
//! Response ◄──────────── create_response (links, embedded, negotiation)
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use hypatia::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut app = App::new();
//! app.use_middleware(RequestIdMiddleware::new());
//! app.get("/documents/:id", handler_fn(|ctx: &mut Context| {
//!     Box::pin(async move {
//!         let id = ctx.param("id").unwrap_or_default().to_string();
//!         let links = ResourceLinks::new().with("self", format!("/documents/{id}"));
//!         respond_with(ctx, &json!({ "id": id }), ResponseOptions::new().links(links))?;
//!         Ok(())
//!     })
//! }))?;
//!
//! let dispatcher = app.build();
//! # let _ = dispatcher;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use hypatia_config as config;
pub use hypatia_core as core;
pub use hypatia_middleware as middleware;
pub use hypatia_response as response;
pub use hypatia_router as router;
pub use hypatia_server as server;
pub use hypatia_telemetry as telemetry;
pub use hypatia_workflow as workflow;

/// Common imports for applications.
pub mod prelude {
    pub use hypatia_core::{
        handler_fn, BoxFuture, Context, Handler, KernelError, KernelResult, Request, RequestId,
        Response, ResponseExt, Schema, Validation,
    };

    pub use hypatia_middleware::{
        middleware_fn, Middleware, Next, RequestIdMiddleware, RequestLogMiddleware,
    };

    pub use hypatia_response::{
        create_response, respond_with, validation_error_response, HtmlRenderer, Link,
        MediaType, ResourceLinks, ResponseOptions,
    };

    pub use hypatia_server::{App, ContextWorkflowExt, Dispatcher};

    pub use hypatia_workflow::{
        Task, WorkflowDefinitionInput, WorkflowEngine, WorkflowError, WorkflowInstance,
    };

    pub use hypatia_config::{ConfigLoader, HypatiaConfig};
}
