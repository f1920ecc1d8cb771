//! The registration surface.

use std::sync::Arc;

use http::Method;
use hypatia_config::HypatiaConfig;
use hypatia_core::{BoxedHandler, ContextBuilder, Handler};
use hypatia_middleware::{Middleware, PipelineBuilder};
use hypatia_response::{HtmlRenderer, ResponseSettings, SharedRenderer};
use hypatia_router::{RouteError, RouterBuilder};
use hypatia_workflow::WorkflowEngine;

use crate::dispatcher::Dispatcher;

/// An application under construction.
///
/// Middleware, routes, the workflow definition and the HTML renderer are
/// registered here; [`build`](Self::build) freezes them into a
/// [`Dispatcher`].
///
/// # Example
///
/// ```
/// use hypatia_core::{handler_fn, Context, Response, ResponseExt};
/// use hypatia_server::App;
/// use http::StatusCode;
///
/// # fn main() -> Result<(), hypatia_router::RouteError> {
/// let mut app = App::new();
/// app.get("/health", handler_fn(|ctx: &mut Context| {
///     Box::pin(async move {
///         ctx.respond(Response::text(StatusCode::OK, "ok"));
///         Ok(())
///     })
/// }))?;
///
/// let dispatcher = app.build();
/// assert_eq!(dispatcher.router().len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct App {
    config: HypatiaConfig,
    middleware: PipelineBuilder,
    routes: RouterBuilder<BoxedHandler>,
    workflow: WorkflowEngine,
    renderer: Option<SharedRenderer>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Creates an application with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HypatiaConfig::default())
    }

    /// Creates an application with the given configuration.
    #[must_use]
    pub fn with_config(config: HypatiaConfig) -> Self {
        let routes = RouterBuilder::new().duplicate_policy(config.router.duplicate_routes.into());
        Self {
            config,
            middleware: PipelineBuilder::new(),
            routes,
            workflow: WorkflowEngine::new(),
            renderer: None,
        }
    }

    /// The configuration this app was created with.
    #[must_use]
    pub const fn config(&self) -> &HypatiaConfig {
        &self.config
    }

    /// Appends a global middleware. Earlier registrations run first.
    pub fn use_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Registers a handler for `method` and `path`.
    ///
    /// # Errors
    ///
    /// Fails on a malformed pattern, or on a duplicate when the configured
    /// policy is `reject`.
    pub fn route<H: Handler>(
        &mut self,
        method: Method,
        path: &str,
        handler: H,
    ) -> Result<&mut Self, RouteError> {
        tracing::debug!(http.method = %method, http.route = path, "Registering route");
        self.routes.insert(method, path, Arc::new(handler))?;
        Ok(self)
    }

    /// Registers a `GET` handler. `HEAD` requests fall back to it.
    ///
    /// # Errors
    ///
    /// See [`route`](Self::route).
    pub fn get<H: Handler>(&mut self, path: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.route(Method::GET, path, handler)
    }

    /// Registers a `POST` handler.
    ///
    /// # Errors
    ///
    /// See [`route`](Self::route).
    pub fn post<H: Handler>(&mut self, path: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.route(Method::POST, path, handler)
    }

    /// Registers a `PUT` handler.
    ///
    /// # Errors
    ///
    /// See [`route`](Self::route).
    pub fn put<H: Handler>(&mut self, path: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.route(Method::PUT, path, handler)
    }

    /// Registers a `PATCH` handler.
    ///
    /// # Errors
    ///
    /// See [`route`](Self::route).
    pub fn patch<H: Handler>(&mut self, path: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.route(Method::PATCH, path, handler)
    }

    /// Registers a `DELETE` handler.
    ///
    /// # Errors
    ///
    /// See [`route`](Self::route).
    pub fn delete<H: Handler>(&mut self, path: &str, handler: H) -> Result<&mut Self, RouteError> {
        self.route(Method::DELETE, path, handler)
    }

    /// The workflow engine bound to this app.
    ///
    /// Load the definition here at startup; handlers reach the frozen
    /// engine through [`ContextWorkflowExt`](crate::ContextWorkflowExt).
    pub fn workflow(&mut self) -> &mut WorkflowEngine {
        &mut self.workflow
    }

    /// Installs the app-wide HTML renderer.
    pub fn renderer<R: HtmlRenderer>(&mut self, renderer: R) -> &mut Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Freezes the app into a [`Dispatcher`].
    #[must_use]
    pub fn build(self) -> Dispatcher {
        let router = self.routes.build();
        let pipeline = self.middleware.build();
        tracing::info!(
            routes = router.len(),
            middleware = ?pipeline.stage_names(),
            workflow_loaded = self.workflow.is_loaded(),
            "Application built"
        );

        let context_builder = ContextBuilder::new()
            .trust_request_id(self.config.dispatcher.trust_request_id)
            .max_body_bytes(self.config.dispatcher.max_body_bytes);
        let settings = ResponseSettings {
            default_media_type: self.config.response.default_media_type,
            pretty_json: self.config.response.pretty_json,
        };

        Dispatcher::new(
            context_builder,
            pipeline,
            router,
            settings,
            self.renderer,
            self.workflow,
        )
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("middleware", &self.middleware)
            .field("routes", &self.routes.len())
            .field("workflow_loaded", &self.workflow.is_loaded())
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}
