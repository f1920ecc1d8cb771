//! HTML rendering collaborator.
//!
//! The kernel does not render markup itself. Applications install an
//! [`HtmlRenderer`] (a template engine adapter, say) either per response
//! through [`ResponseOptions::renderer`](crate::ResponseOptions::renderer) or
//! app-wide, in which case the dispatcher stores it on every context as an
//! [`AppRenderer`] extension.

use std::sync::Arc;

use hypatia_core::Context;
use serde_json::Value;

use crate::error::ResponseError;

/// Renders a payload to HTML.
pub trait HtmlRenderer: Send + Sync + 'static {
    /// Renders `data`, optionally with a named template.
    fn render(&self, template: Option<&str>, data: &Value) -> Result<String, ResponseError>;
}

/// A shared renderer.
pub type SharedRenderer = Arc<dyn HtmlRenderer>;

/// A renderer built from a closure.
pub struct FnRenderer<F>(F);

impl<F> FnRenderer<F>
where
    F: Fn(Option<&str>, &Value) -> Result<String, ResponseError> + Send + Sync + 'static,
{
    /// Wraps `func`.
    pub const fn new(func: F) -> Self {
        Self(func)
    }
}

impl<F> HtmlRenderer for FnRenderer<F>
where
    F: Fn(Option<&str>, &Value) -> Result<String, ResponseError> + Send + Sync + 'static,
{
    fn render(&self, template: Option<&str>, data: &Value) -> Result<String, ResponseError> {
        (self.0)(template, data)
    }
}

impl<F> std::fmt::Debug for FnRenderer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRenderer").finish_non_exhaustive()
    }
}

/// Context extension carrying the app-wide renderer.
#[derive(Clone)]
pub struct AppRenderer(pub SharedRenderer);

impl AppRenderer {
    /// Returns the renderer installed on `ctx`, if any.
    pub fn from_context(ctx: &Context) -> Option<SharedRenderer> {
        ctx.get_extension::<Self>().map(|r| Arc::clone(&r.0))
    }
}

impl std::fmt::Debug for AppRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AppRenderer")
    }
}
