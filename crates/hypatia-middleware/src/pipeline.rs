//! Ordered middleware pipeline.
//!
//! Middleware is added to a [`PipelineBuilder`] in the order it should run
//! and frozen into a [`Pipeline`]. Each request folds the stages right to
//! left around the terminal handler: the last stage added becomes the
//! innermost wrapper, the first stage added runs first.
//!
//! ```text
//! run(ctx) → stage[0] → stage[1] → … → stage[n-1] → handler
//!                                                      ↓
//!   result ← stage[0] ← stage[1] ← … ← stage[n-1] ←───┘
//! ```

use std::sync::Arc;

use hypatia_core::{Context, Handler, KernelResult};

use crate::middleware::{Middleware, Next};

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable, ordered list of middleware stages.
///
/// Cloning is cheap; stages are shared.
///
/// # Example
///
/// ```
/// use hypatia_core::{handler_fn, Context, Response, ResponseExt};
/// use hypatia_middleware::{Pipeline, RequestIdMiddleware};
/// use http::{Method, StatusCode, Uri};
///
/// # tokio_test::block_on(async {
/// let pipeline = Pipeline::builder().add(RequestIdMiddleware::new()).build();
/// let handler = handler_fn(|ctx: &mut Context| {
///     Box::pin(async move {
///         ctx.respond(Response::text(StatusCode::OK, "ok"));
///         Ok(())
///     })
/// });
///
/// let mut ctx = Context::new(Method::GET, Uri::from_static("/"));
/// pipeline.run(&mut ctx, &handler).await.unwrap();
/// assert!(ctx.response().unwrap().headers().contains_key("x-request-id"));
/// # });
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs `ctx` through every stage and then `endpoint`.
    pub async fn run(&self, ctx: &mut Context, endpoint: &dyn Handler) -> KernelResult<()> {
        self.chain(endpoint).run(ctx).await
    }

    fn chain<'a>(&'a self, endpoint: &'a dyn Handler) -> Next<'a> {
        self.stages
            .iter()
            .rev()
            .fold(Next::endpoint(endpoint), |next, middleware| {
                Next::new(middleware.as_ref(), next)
            })
    }

    /// Returns the names of all stages in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the pipeline has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage; stages run in the order they are added.
    pub fn add<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared stage.
    pub fn add_boxed(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Appends a stage through a mutable reference.
    pub fn push(&mut self, middleware: BoxedMiddleware) {
        self.stages.push(middleware);
    }

    /// Freezes the stages into a [`Pipeline`].
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("stages", &self.stages.len())
            .finish()
    }
}
