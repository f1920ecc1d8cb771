//! Error types for the Hypatia kernel.
//!
//! [`KernelError`] is the error type handlers and middleware return. Expected
//! input problems are not errors at this layer: they travel as
//! [`Validation`](crate::Validation) values on the context and only become a
//! [`KernelError`] when a handler decides to reject the request.
//!
//! Every error maps to an [`ErrorCategory`], which in turn maps to an HTTP
//! status code and a machine-readable code in the JSON error envelope:
//!
//! ```json
//! {
//!   "error": {
//!     "code": "VALIDATION_ERROR",
//!     "message": "Validation error: invalid body",
//!     "category": "validation",
//!     "details": ["name: missing field"]
//!   },
//!   "request_id": "0190..."
//! }
//! ```

use bytes::Bytes;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Response, ResponseExt};

/// Result type alias using [`KernelError`].
pub type KernelResult<T> = Result<T, KernelError>;

/// Message sent to clients in place of internal error details.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request validation errors (invalid input, schema mismatch).
    Validation,
    /// Authentication errors (invalid/missing credentials).
    Authentication,
    /// Authorization errors (permission denied).
    Authorization,
    /// Resource or route not found.
    NotFound,
    /// Conflict with the current resource state.
    Conflict,
    /// Rate limiting.
    RateLimited,
    /// Request timeout.
    Timeout,
    /// Processing was cancelled or the service cannot serve it right now.
    Unavailable,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable error code used in envelopes.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Authentication => "AUTHENTICATION_ERROR",
            Self::Authorization => "AUTHORIZATION_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::RateLimited => "RATE_LIMITED",
            Self::Timeout => "TIMEOUT",
            Self::Unavailable => "SERVICE_UNAVAILABLE",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Standard error type for the kernel.
///
/// # Example
///
/// ```
/// use hypatia_core::{KernelError, ErrorCategory};
///
/// fn find_product(id: &str) -> Result<(), KernelError> {
///     Err(KernelError::not_found_resource("Product", id))
/// }
///
/// let err = find_product("42").unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::NotFound);
/// ```
#[derive(Error, Debug)]
pub enum KernelError {
    /// A handler rejected the request because its input did not validate.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// One entry per field-level problem.
        details: Vec<String>,
    },

    /// Authentication failed.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Authorization denied.
    #[error("Authorization denied: {message}")]
    Authorization {
        /// Human-readable error message.
        message: String,
    },

    /// Resource or route not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// The type of resource that was not found.
        resource_type: Option<String>,
        /// The identifier of the resource.
        resource_id: Option<String>,
    },

    /// Conflict with current resource state.
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable error message.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Human-readable error message.
        message: String,
        /// Seconds until the rate limit resets.
        retry_after_seconds: Option<u64>,
    },

    /// Request timeout.
    #[error("Timeout: {message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },

    /// Processing was cancelled or cannot proceed right now.
    #[error("Unavailable: {message}")]
    Unavailable {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message (logged, never sent to clients).
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl KernelError {
    /// Creates a validation error with a message and no details.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Creates a validation error carrying the per-field problems.
    #[must_use]
    pub fn validation_with_details(message: impl Into<String>, details: Vec<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: None,
            resource_id: None,
        }
    }

    /// Creates a not found error with resource context.
    #[must_use]
    pub fn not_found_resource(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        let resource_type = resource_type.into();
        let resource_id = resource_id.into();
        Self::NotFound {
            message: format!("{resource_type} with ID '{resource_id}' not found"),
            resource_type: Some(resource_type),
            resource_id: Some(resource_id),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>, retry_after_seconds: Option<u64>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after_seconds,
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::RateLimited { .. } => ErrorCategory::RateLimited,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Unavailable { .. } => ErrorCategory::Unavailable,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns true for errors whose message must not reach the client.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Converts this error to a serializable error envelope.
    ///
    /// Internal errors are reported with a generic message.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        let category = self.category();
        let message = if self.is_internal() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        ErrorEnvelope {
            error: ErrorDetail {
                code: category.code().to_string(),
                message,
                category,
                details: self.error_details(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

    /// Renders this error as a JSON HTTP response.
    #[must_use]
    pub fn to_response(&self, request_id: Option<&str>) -> Response {
        let envelope = self.to_envelope(request_id);
        let body = serde_json::to_vec(&envelope).unwrap_or_else(|_| {
            br#"{"error":{"code":"INTERNAL_ERROR","message":"internal server error","category":"internal"}}"#
                .to_vec()
        });

        let mut response = Response::json_bytes(self.status_code(), Bytes::from(body));
        if let Self::RateLimited {
            retry_after_seconds: Some(seconds),
            ..
        } = self
        {
            if let Ok(value) = http::HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(http::header::RETRY_AFTER, value);
            }
        }
        response
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation { details, .. } if !details.is_empty() => {
                Some(serde_json::json!(details))
            }
            Self::NotFound {
                resource_type: Some(rt),
                resource_id: Some(rid),
                ..
            } => Some(serde_json::json!({
                "resource_type": rt,
                "resource_id": rid
            })),
            Self::RateLimited {
                retry_after_seconds: Some(seconds),
                ..
            } => Some(serde_json::json!({
                "retry_after_seconds": seconds
            })),
            _ => None,
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
