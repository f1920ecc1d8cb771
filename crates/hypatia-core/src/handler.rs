//! Handler trait for request processing.
//!
//! A handler receives the request [`Context`] and records its outcome on it,
//! usually by calling [`Context::respond`]. Returning an error is reserved for
//! failures the handler did not expect; the dispatcher turns those into an
//! error response with a correlation identifier.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::KernelResult;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased handler that can be stored in route tables.
pub type BoxedHandler = Arc<dyn Handler>;

/// The terminal step of a request.
///
/// # Example
///
/// ```
/// use hypatia_core::{BoxFuture, Context, Handler, KernelResult, Response, ResponseExt};
/// use http::StatusCode;
///
/// struct Health;
///
/// impl Handler for Health {
///     fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, KernelResult<()>> {
///         Box::pin(async move {
///             ctx.respond(Response::text(StatusCode::OK, "ok"));
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Handles the request described by `ctx`.
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, KernelResult<()>>;
}

/// A handler built from a function or closure.
///
/// # Example
///
/// ```
/// use hypatia_core::{handler_fn, Context, Response, ResponseExt};
/// use http::StatusCode;
///
/// let handler = handler_fn(|ctx: &mut Context| {
///     Box::pin(async move {
///         ctx.respond(Response::text(StatusCode::OK, "pong"));
///         Ok(())
///     })
/// });
/// # let _ = handler;
/// ```
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F> {
    /// Wraps `func` as a handler.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, KernelResult<()>> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, KernelResult<()>> {
        (self.func)(ctx)
    }
}

/// Creates a [`FnHandler`] from a closure.
pub fn handler_fn<F>(func: F) -> FnHandler<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, KernelResult<()>> + Send + Sync + 'static,
{
    FnHandler::new(func)
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, KernelResult<()>> {
        (**self).call(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Response, ResponseExt};
    use crate::KernelError;
    use http::{Method, StatusCode};

    #[tokio::test]
    async fn test_fn_handler_sets_response() {
        let handler = handler_fn(|ctx: &mut Context| {
            Box::pin(async move {
                ctx.set_status(StatusCode::CREATED);
                ctx.respond(Response::empty(StatusCode::CREATED));
                Ok(())
            })
        });

        let mut ctx = Context::new(Method::POST, "/products".parse().unwrap());
        handler.call(&mut ctx).await.unwrap();
        assert_eq!(ctx.response().unwrap().status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_boxed_handler_propagates_error() {
        let handler: BoxedHandler = Arc::new(handler_fn(|_ctx: &mut Context| {
            Box::pin(async move { Err(KernelError::conflict("already submitted")) })
        }));

        let mut ctx = Context::new(Method::POST, "/documents/1".parse().unwrap());
        let err = handler.call(&mut ctx).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(!ctx.has_response());
    }
}
