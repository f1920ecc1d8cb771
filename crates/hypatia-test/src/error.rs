//! Test error types.

use thiserror::Error;

/// Errors raised while building a test request or reading its response.
#[derive(Error, Debug)]
pub enum TestError {
    /// The request could not be assembled.
    #[error("request build error: {0}")]
    RequestBuild(String),

    /// A header name or value was rejected.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The body could not be encoded as a form.
    #[error("form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response body is not UTF-8.
    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
