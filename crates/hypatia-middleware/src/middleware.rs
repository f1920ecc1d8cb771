//! Core middleware trait and the `Next` continuation.
//!
//! A middleware receives the request [`Context`] and a [`Next`] value that
//! runs the rest of the chain. Awaiting `next.run(ctx)` resumes once every
//! inner middleware and the terminal handler have settled. Not calling it
//! ends the chain at that point: nothing registered after the middleware
//! runs, and neither does the handler.
//!
//! `Next::run` takes `self` by value, so a middleware cannot continue the
//! chain twice.
//!
//! # Example
//!
//! ```
//! use hypatia_core::{BoxFuture, Context, KernelResult};
//! use hypatia_middleware::{Middleware, Next};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, KernelResult<()>> {
//!         Box::pin(async move {
//!             let result = next.run(ctx).await;
//!             tracing::debug!(elapsed = ?ctx.elapsed(), "request finished");
//!             result
//!         })
//!     }
//! }
//! ```

use hypatia_core::{BoxFuture, Context, Handler, KernelResult};

/// A request-processing step.
///
/// Implementations either continue the chain with [`Next::run`] or
/// short-circuit by returning without calling it, usually after setting a
/// response with [`Context::respond`].
///
/// Errors from downstream should be propagated, not swallowed, so the
/// dispatcher can convert them once at its boundary.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs and
    /// [`Pipeline::stage_names`](crate::Pipeline::stage_names).
    fn name(&self) -> &'static str;

    /// Processes the request.
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, KernelResult<()>>;
}

/// Continuation that runs the remainder of the chain.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More middleware to process.
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain, invoke the handler.
    Endpoint(&'a dyn Handler),
}

impl<'a> Next<'a> {
    /// Wraps `next` with `middleware`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal continuation that invokes `handler`.
    pub fn endpoint(handler: &'a dyn Handler) -> Self {
        Self {
            inner: NextInner::Endpoint(handler),
        }
    }

    /// Runs the next middleware, or the handler at the end of the chain.
    pub async fn run(self, ctx: &mut Context) -> KernelResult<()> {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.handle(ctx, *next).await,
            NextInner::Endpoint(handler) => handler.call(ctx).await,
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            NextInner::Chain { middleware, .. } => f
                .debug_struct("Next")
                .field("middleware", &middleware.name())
                .finish_non_exhaustive(),
            NextInner::Endpoint(_) => f.debug_struct("Next").field("endpoint", &true).finish(),
        }
    }
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use hypatia_core::{Context, Response, ResponseExt};
/// use hypatia_middleware::{middleware_fn, Next};
/// use http::StatusCode;
///
/// let deny = middleware_fn("deny", |ctx: &mut Context, _next: Next<'_>| {
///     Box::pin(async move {
///         ctx.respond(Response::text(StatusCode::FORBIDDEN, "forbidden"));
///         Ok(())
///     })
/// });
/// # let _ = deny;
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, KernelResult<()>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, KernelResult<()>> {
        (self.func)(ctx, next)
    }
}

/// Creates a [`FnMiddleware`].
pub fn middleware_fn<F>(name: &'static str, func: F) -> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, KernelResult<()>>
        + Send
        + Sync
        + 'static,
{
    FnMiddleware::new(name, func)
}
