//! Response building errors.

use hypatia_core::KernelError;
use thiserror::Error;

/// Errors raised while building a response.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The payload could not be serialized.
    #[error("failed to serialize response payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An embedded resource could not be serialized.
    #[error("failed to serialize embedded resource '{rel}': {message}")]
    Embed {
        /// Relation the resource was embedded under.
        rel: String,
        /// What went wrong.
        message: String,
    },

    /// HTML was requested explicitly but no renderer is installed.
    #[error("text/html requested but no HTML renderer is installed")]
    RendererMissing,

    /// The renderer failed.
    #[error("failed to render template{}: {message}", quoted(.template))]
    Render {
        /// The template, if one was named.
        template: Option<String>,
        /// What went wrong.
        message: String,
    },
}

fn quoted(template: &Option<String>) -> String {
    template
        .as_deref()
        .map(|t| format!(" '{t}'"))
        .unwrap_or_default()
}

impl ResponseError {
    /// Creates a render error.
    pub fn render(template: Option<&str>, message: impl Into<String>) -> Self {
        Self::Render {
            template: template.map(ToString::to_string),
            message: message.into(),
        }
    }
}

impl From<ResponseError> for KernelError {
    fn from(error: ResponseError) -> Self {
        Self::internal_with_source(error.to_string(), error)
    }
}
