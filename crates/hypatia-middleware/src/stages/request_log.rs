//! Request logging middleware.
//!
//! Emits one structured log event per request once the inner chain has
//! settled, with the method, path, final status, and duration. Failed
//! requests are logged at `warn` with the error; everything else at `info`.

use hypatia_core::{BoxFuture, Context, KernelResult};
use tracing::Level;

use crate::middleware::{Middleware, Next};

/// Middleware that logs request completion.
#[derive(Debug, Clone, Copy)]
pub struct RequestLogMiddleware {
    level: Level,
}

impl Default for RequestLogMiddleware {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl RequestLogMiddleware {
    /// Creates a request log middleware that logs successes at `info`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs successful requests at `debug` instead of `info`.
    #[must_use]
    pub const fn quiet(mut self) -> Self {
        self.level = Level::DEBUG;
        self
    }
}

impl Middleware for RequestLogMiddleware {
    fn name(&self) -> &'static str {
        "request_log"
    }

    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, KernelResult<()>> {
        Box::pin(async move {
            let result = next.run(ctx).await;

            let status = ctx
                .response()
                .map_or_else(|| ctx.status().as_u16(), |r| r.status().as_u16());
            let duration_ms = ctx.elapsed().as_secs_f64() * 1000.0;

            match &result {
                Err(error) => tracing::warn!(
                    request_id = %ctx.request_id(),
                    http.method = %ctx.method(),
                    http.path = %ctx.path(),
                    http.status_code = error.status_code().as_u16(),
                    duration_ms,
                    error = %error,
                    "request failed"
                ),
                Ok(()) if self.level == Level::DEBUG => tracing::debug!(
                    request_id = %ctx.request_id(),
                    http.method = %ctx.method(),
                    http.path = %ctx.path(),
                    http.status_code = status,
                    duration_ms,
                    "request completed"
                ),
                Ok(()) => tracing::info!(
                    request_id = %ctx.request_id(),
                    http.method = %ctx.method(),
                    http.path = %ctx.path(),
                    http.status_code = status,
                    duration_ms,
                    "request completed"
                ),
            }

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pipeline;
    use hypatia_core::{handler_fn, KernelError, Response, ResponseExt};
    use http::{Method, StatusCode, Uri};

    #[test]
    fn test_levels() {
        assert_eq!(RequestLogMiddleware::new().level, Level::INFO);
        assert_eq!(RequestLogMiddleware::new().quiet().level, Level::DEBUG);
        assert_eq!(RequestLogMiddleware::new().name(), "request_log");
    }

    #[tokio::test]
    async fn test_passes_through_success() {
        let pipeline = Pipeline::builder().add(RequestLogMiddleware::new()).build();
        let handler = handler_fn(|ctx: &mut Context| {
            Box::pin(async move {
                ctx.respond(Response::text(StatusCode::CREATED, "made"));
                Ok(())
            })
        });

        let mut ctx = Context::new(Method::POST, Uri::from_static("/things"));
        pipeline.run(&mut ctx, &handler).await.unwrap();
        assert_eq!(ctx.response().unwrap().status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_passes_through_error() {
        let pipeline = Pipeline::builder()
            .add(RequestLogMiddleware::new().quiet())
            .build();
        let handler = handler_fn(|_ctx: &mut Context| {
            Box::pin(async move { Err(KernelError::not_found("missing")) })
        });

        let mut ctx = Context::new(Method::GET, Uri::from_static("/things/9"));
        let err = pipeline.run(&mut ctx, &handler).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
