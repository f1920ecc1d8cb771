//! Common HTTP types used throughout the kernel.
//!
//! Request and response bodies are fully buffered. Streaming is the business
//! of the transport layer in front of the dispatcher.

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type consumed by the context builder.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by handlers and the dispatcher.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building small fixed responses.
pub trait ResponseExt {
    /// Creates a plain text response with the given status code.
    fn text(status: http::StatusCode, message: &str) -> Response;

    /// Creates an empty response with the given status code.
    fn empty(status: http::StatusCode) -> Response;

    /// Creates a JSON response from an already-serialized body.
    fn json_bytes(status: http::StatusCode, body: impl Into<Bytes>) -> Response;
}

impl ResponseExt for Response {
    fn text(status: http::StatusCode, message: &str) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::from(message.to_string())));
        *response.status_mut() = status;
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }

    fn empty(status: http::StatusCode) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }

    fn json_bytes(status: http::StatusCode, body: impl Into<Bytes>) -> Response {
        let mut response = http::Response::new(Full::new(body.into()));
        *response.status_mut() = status;
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        response
    }
}
