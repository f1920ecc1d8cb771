//! Route registration errors.

use http::Method;
use thiserror::Error;

/// Errors raised while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The path pattern cannot be compiled.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The route is already registered and the policy forbids overwriting.
    #[error("route {method} {path} is already registered")]
    Duplicate {
        /// The HTTP method.
        method: Method,
        /// The normalized path.
        path: String,
    },
}

impl RouteError {
    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}
