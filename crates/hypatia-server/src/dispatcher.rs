//! Per-request orchestration.
//!
//! ```text
//! Request ─► ContextBuilder ─► Pipeline ─► RouteEndpoint ─► handler
//!                                 │              │
//!                                 └─ early exit  └─ 404 on miss
//!                    ▼
//!        ctx.response | 204 | error envelope (500 on panic)
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::FutureExt;
use http::header::HeaderValue;
use http::{Method, StatusCode};
use http_body_util::Full;
use hypatia_core::{
    Context, ContextBuilder, KernelError, Request, Response, ResponseExt, REQUEST_ID_HEADER,
};
use hypatia_middleware::Pipeline;
use hypatia_response::{AppRenderer, ResponseSettings, SharedRenderer};
use hypatia_router::Router;
use hypatia_telemetry::{log_request_complete, log_request_error};
use hypatia_workflow::WorkflowEngine;

use crate::endpoint::RouteEndpoint;

/// The frozen application: turns requests into responses.
///
/// Built by [`App::build`](crate::App::build). Route tables, the pipeline
/// and the workflow definition are read-only from here on, so a
/// `Dispatcher` can be shared behind an `Arc` across tasks.
pub struct Dispatcher {
    context_builder: ContextBuilder,
    pipeline: Pipeline,
    endpoint: RouteEndpoint,
    settings: ResponseSettings,
    renderer: Option<SharedRenderer>,
    workflow: Arc<WorkflowEngine>,
}

impl Dispatcher {
    pub(crate) fn new(
        context_builder: ContextBuilder,
        pipeline: Pipeline,
        router: Router<hypatia_core::BoxedHandler>,
        settings: ResponseSettings,
        renderer: Option<SharedRenderer>,
        workflow: WorkflowEngine,
    ) -> Self {
        Self {
            context_builder,
            pipeline,
            endpoint: RouteEndpoint::new(router),
            settings,
            renderer,
            workflow: Arc::new(workflow),
        }
    }

    /// Handles one request.
    ///
    /// Never fails: handler errors and panics become error envelopes
    /// carrying the request id, and a request nobody answered gets
    /// `204 No Content`.
    pub async fn dispatch(&self, request: Request) -> Response {
        let mut ctx = self.context_builder.build(request).await;
        self.install_extensions(&mut ctx);

        let outcome = AssertUnwindSafe(self.pipeline.run(&mut ctx, &self.endpoint))
            .catch_unwind()
            .await;

        let request_id = ctx.request_id().to_string();
        let mut response = match outcome {
            Ok(Ok(())) => ctx
                .take_response()
                .unwrap_or_else(|| Response::empty(StatusCode::NO_CONTENT)),
            Ok(Err(error)) => {
                if error.is_internal() {
                    log_request_error!(request_id, ctx.method(), ctx.path(), error);
                } else {
                    tracing::debug!(
                        request_id = %request_id,
                        error = %error,
                        "Handler returned an error"
                    );
                }
                error.to_response(Some(&request_id))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                log_request_error!(request_id, ctx.method(), ctx.path(), message);
                KernelError::internal(message).to_response(Some(&request_id))
            }
        };

        merge_context_headers(&ctx, &mut response);
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .entry(REQUEST_ID_HEADER)
                .or_insert(value);
        }
        if *ctx.method() == Method::HEAD {
            *response.body_mut() = Full::new(Bytes::new());
        }

        log_request_complete!(
            request_id,
            ctx.method(),
            ctx.path(),
            response.status().as_u16(),
            ctx.elapsed().as_secs_f64() * 1000.0
        );
        response
    }

    /// The frozen route table.
    #[must_use]
    pub fn router(&self) -> &Router<hypatia_core::BoxedHandler> {
        self.endpoint.router()
    }

    /// The global middleware pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// The frozen workflow engine.
    #[must_use]
    pub fn workflow(&self) -> &WorkflowEngine {
        &self.workflow
    }

    fn install_extensions(&self, ctx: &mut Context) {
        ctx.set_extension(self.settings);
        ctx.set_extension(Arc::clone(&self.workflow));
        if let Some(renderer) = &self.renderer {
            ctx.set_extension(AppRenderer(Arc::clone(renderer)));
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pipeline", &self.pipeline)
            .field("endpoint", &self.endpoint)
            .field("settings", &self.settings)
            .field("renderer", &self.renderer.is_some())
            .field("workflow_loaded", &self.workflow.is_loaded())
            .finish_non_exhaustive()
    }
}

/// Copies context headers the response does not already carry.
fn merge_context_headers(ctx: &Context, response: &mut Response) {
    for name in ctx.headers().keys() {
        if response.headers().contains_key(name) {
            continue;
        }
        for value in ctx.headers().get_all(name) {
            response.headers_mut().append(name.clone(), value.clone());
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .map_or_else(|| "handler panicked".to_string(), |msg| format!("handler panicked: {msg}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "handler panicked: boom");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("bad state"));
        assert_eq!(panic_message(boxed.as_ref()), "handler panicked: bad state");

        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "handler panicked");
    }

    #[test]
    fn test_merge_keeps_response_headers() {
        let mut ctx = Context::new(Method::GET, "/".parse().unwrap());
        ctx.headers_mut()
            .insert("x-trace", HeaderValue::from_static("ctx"));
        ctx.headers_mut()
            .insert("cache-control", HeaderValue::from_static("no-store"));

        let mut response = Response::empty(StatusCode::OK);
        response
            .headers_mut()
            .insert("x-trace", HeaderValue::from_static("handler"));
        merge_context_headers(&ctx, &mut response);

        assert_eq!(response.headers()["x-trace"], "handler");
        assert_eq!(response.headers()["cache-control"], "no-store");
    }
}
