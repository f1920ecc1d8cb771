//! The pipeline's terminal step: route lookup and handler invocation.

use std::sync::Arc;

use http::Method;
use hypatia_core::{BoxFuture, BoxedHandler, Context, Handler, KernelError, KernelResult};
use hypatia_router::{RouteOutcome, Router};

/// Resolves the route for a context and runs its handler.
///
/// A context that already holds a response is left untouched and no route
/// is resolved. A miss records a 404 error envelope on the context. `HEAD`
/// requests without a `HEAD` route fall back to the `GET` route.
#[derive(Clone)]
pub(crate) struct RouteEndpoint {
    router: Arc<Router<BoxedHandler>>,
}

impl RouteEndpoint {
    pub(crate) fn new(router: Router<BoxedHandler>) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    pub(crate) fn router(&self) -> &Router<BoxedHandler> {
        &self.router
    }

    fn lookup(&self, method: &Method, path: &str) -> RouteOutcome<'_, BoxedHandler> {
        match self.router.match_route(method, path) {
            RouteOutcome::NotFound if *method == Method::HEAD => {
                self.router.match_route(&Method::GET, path)
            }
            outcome => outcome,
        }
    }
}

impl Handler for RouteEndpoint {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, KernelResult<()>> {
        Box::pin(async move {
            if ctx.response().is_some() {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    "Response already set, skipping route resolution"
                );
                return Ok(());
            }

            let Some(matched) = self.lookup(ctx.method(), ctx.path()).into_match() else {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    http.method = %ctx.method(),
                    http.path = %ctx.path(),
                    "No route matched"
                );
                let error =
                    KernelError::not_found(format!("no route for {} {}", ctx.method(), ctx.path()));
                let response = error.to_response(Some(&ctx.request_id().to_string()));
                ctx.respond(response);
                return Ok(());
            };

            tracing::trace!(
                request_id = %ctx.request_id(),
                http.route = matched.pattern,
                "Route matched"
            );
            let handler = Arc::clone(matched.value);
            ctx.set_params(matched.params.into());
            handler.call(ctx).await
        })
    }
}

impl std::fmt::Debug for RouteEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEndpoint")
            .field("routes", &self.router.len())
            .finish()
    }
}
