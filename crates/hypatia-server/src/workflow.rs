//! Access to the application's workflow engine from handlers.

use std::sync::Arc;

use hypatia_core::{Context, KernelError, KernelResult};
use hypatia_workflow::WorkflowEngine;

/// Extension methods for reaching the frozen [`WorkflowEngine`] from a [`Context`].
///
/// The dispatcher installs the engine on every context it builds.
///
/// # Example
///
/// ```
/// use hypatia_core::{handler_fn, Context, KernelResult};
/// use hypatia_server::ContextWorkflowExt;
///
/// let handler = handler_fn(|ctx: &mut Context| {
///     Box::pin(async move {
///         let instance = ctx.workflow()?.create_instance()?;
///         ctx.set_state("workflow.state", instance.current_state().into());
///         Ok(())
///     })
/// });
/// # let _ = handler;
/// ```
pub trait ContextWorkflowExt {
    /// Returns the engine, or an internal error when none is installed.
    ///
    /// # Errors
    ///
    /// Fails when the context was not built by a dispatcher.
    fn workflow(&self) -> KernelResult<&WorkflowEngine>;
}

impl ContextWorkflowExt for Context {
    fn workflow(&self) -> KernelResult<&WorkflowEngine> {
        self.get_extension::<Arc<WorkflowEngine>>()
            .map(AsRef::as_ref)
            .ok_or_else(|| KernelError::internal("no workflow engine installed on context"))
    }
}
