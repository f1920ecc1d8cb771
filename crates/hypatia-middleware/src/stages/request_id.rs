//! Request ID middleware.
//!
//! Every [`Context`] already carries a [`RequestId`](hypatia_core::RequestId),
//! either generated as a UUID v7 or taken from a trusted incoming
//! `x-request-id` header when the context was built. This stage echoes it
//! back on the response so clients can quote it when reporting problems.
//!
//! When the chain has produced a response, the header is added to it
//! directly. Otherwise it is added to the context's response headers, which
//! the response builder and the dispatcher copy onto the final response.

use http::HeaderValue;
use hypatia_core::{BoxFuture, Context, KernelResult, REQUEST_ID_HEADER};

use crate::middleware::{Middleware, Next};

/// Middleware that sets the `x-request-id` response header.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdMiddleware;

impl RequestIdMiddleware {
    /// Creates a new request ID middleware.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, KernelResult<()>> {
        Box::pin(async move {
            let result = next.run(ctx).await;

            // A UUID always renders as a valid header value.
            if let Ok(value) = HeaderValue::from_str(&ctx.request_id().to_string()) {
                match ctx.response_mut() {
                    Some(response) => {
                        response.headers_mut().insert(REQUEST_ID_HEADER, value);
                    }
                    None => {
                        ctx.headers_mut().insert(REQUEST_ID_HEADER, value);
                    }
                }
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

    fn ctx() -> Context {
        Context::new(Method::GET, Uri::from_static("/"))
    }

    #[test]
    fn test_name() {
        assert_eq!(RequestIdMiddleware::new().name(), "request_id");
    }

    #[tokio::test]
    async fn test_sets_header_on_response() {
        let pipeline = Pipeline::builder().add(RequestIdMiddleware::new()).build();
        let handler = handler_fn(|ctx: &mut Context| {
            Box::pin(async move {
                ctx.respond(Response::text(StatusCode::OK, "ok"));
                Ok(())
            })
        });

        let mut ctx = ctx();
        let expected = ctx.request_id().to_string();
        pipeline.run(&mut ctx, &handler).await.unwrap();

        let header = ctx.response().unwrap().headers().get(REQUEST_ID_HEADER).unwrap();
        assert_eq!(header.to_str().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_sets_context_header_without_response() {
        let pipeline = Pipeline::builder().add(RequestIdMiddleware::new()).build();
        let handler = handler_fn(|_ctx: &mut Context| Box::pin(async move { Ok(()) }));

        let mut ctx = ctx();
        pipeline.run(&mut ctx, &handler).await.unwrap();

        assert!(ctx.response().is_none());
        assert!(ctx.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_header_set_even_when_handler_fails() {
        let pipeline = Pipeline::builder().add(RequestIdMiddleware::new()).build();
        let handler = handler_fn(|_ctx: &mut Context| {
            Box::pin(async move { Err(KernelError::internal("boom")) })
        });

        let mut ctx = ctx();
        assert!(pipeline.run(&mut ctx, &handler).await.is_err());
        assert!(ctx.headers().contains_key(REQUEST_ID_HEADER));
    }
}
