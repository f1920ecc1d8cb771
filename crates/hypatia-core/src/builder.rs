//! Context construction.
//!
//! [`ContextBuilder`] turns a raw request into a [`Context`]. Construction is
//! total: a malformed query string, header or body is recorded in
//! [`Validated`] and left for the handler to judge. The builder never rejects
//! a request.
//!
//! The steps run in a fixed order:
//!
//! 1. query string → `validated.query`
//! 2. headers → `validated.headers`
//! 3. body (only for methods that carry one) → `validated.body`
//! 4. `validated.params` starts empty; the dispatcher fills it after routing

use bytes::Bytes;
use http::{HeaderMap, Method};
use http_body_util::BodyExt;
use serde_json::Value;

use crate::context::{Context, RequestId, Validated, REQUEST_ID_HEADER};
use crate::types::Request;
use crate::validation::{validate, StringMap, StringMapSchema, Validation};

/// Default maximum body size recorded as valid (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Builds a [`Context`] from an incoming request.
///
/// # Example
///
/// ```
/// use hypatia_core::{ContextBuilder, Request};
/// use bytes::Bytes;
/// use http_body_util::Full;
///
/// # tokio_test::block_on(async {
/// let request: Request = http::Request::builder()
///     .uri("/products?page=2")
///     .body(Full::new(Bytes::new()))
///     .unwrap();
///
/// let ctx = ContextBuilder::new().build(request).await;
/// assert_eq!(ctx.query_param("page"), Some("2"));
/// assert_eq!(ctx.validated().body, Ok(serde_json::Value::Null));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    trust_request_id: bool,
    max_body_bytes: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    /// Creates a builder that always generates fresh request IDs.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            trust_request_id: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Reuses a well-formed incoming `x-request-id` header as the request ID.
    #[must_use]
    pub const fn trust_request_id(mut self, trust: bool) -> Self {
        self.trust_request_id = trust;
        self
    }

    /// Sets the largest body that is parsed.
    ///
    /// Larger bodies are recorded as a body validation error.
    #[must_use]
    pub const fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Consumes the request and produces its context.
    pub async fn build(&self, request: Request) -> Context {
        let (parts, body) = request.into_parts();
        let raw_body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        let request_id = self.request_id(&parts.headers);
        let validated = Validated {
            query: parse_query(parts.uri.query()),
            headers: parse_headers(&parts.headers),
            body: self.parse_body(&parts.method, &parts.headers, &raw_body),
            params: Ok(StringMap::new()),
        };

        if !validated.is_valid() {
            tracing::debug!(
                request_id = %request_id,
                http.method = %parts.method,
                http.path = %parts.uri.path(),
                errors = ?validated.errors(),
                "Request input failed validation"
            );
        }

        Context::from_parts(
            request_id,
            parts.method,
            parts.uri,
            parts.headers,
            raw_body,
            validated,
        )
    }

    fn request_id(&self, headers: &HeaderMap) -> RequestId {
        if !self.trust_request_id {
            return RequestId::new();
        }

        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(RequestId::parse)
            .unwrap_or_default()
    }

    fn parse_body(&self, method: &Method, headers: &HeaderMap, body: &Bytes) -> Validation<Value> {
        if !carries_body(method) || body.is_empty() {
            return Ok(Value::Null);
        }

        if body.len() > self.max_body_bytes {
            return Err(vec![format!(
                "request body of {} bytes exceeds the {} byte limit",
                body.len(),
                self.max_body_bytes
            )]);
        }

        match body_kind(headers) {
            BodyKind::Json => serde_json::from_slice(body).map_err(|e| vec![e.to_string()]),
            BodyKind::Form => serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
                .map(|pairs| {
                    Value::Object(
                        pairs
                            .into_iter()
                            .map(|(k, v)| (k, Value::String(v)))
                            .collect(),
                    )
                })
                .map_err(|e| vec![e.to_string()]),
            BodyKind::Other => Ok(Value::Null),
        }
    }
}

/// How a request body is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(headers: &HeaderMap) -> BodyKind {
    let Some(mime) = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
    else {
        return BodyKind::Other;
    };

    if mime.essence_str() == mime::APPLICATION_JSON.essence_str()
        || mime.suffix().is_some_and(|suffix| suffix == mime::JSON)
    {
        BodyKind::Json
    } else if mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

/// Returns true for methods whose body is parsed.
fn carries_body(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn parse_query(query: Option<&str>) -> Validation<StringMap> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query.unwrap_or(""))
        .map_err(|e| vec![format!("malformed query string: {e}")])?;

    let object = pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    validate(&StringMapSchema, &Value::Object(object))
}

fn parse_headers(headers: &HeaderMap) -> Validation<StringMap> {
    let mut map = StringMap::new();
    let mut errors = Vec::new();

    for (name, value) in headers {
        match value.to_str() {
            Ok(value) => {
                map.entry(name.as_str().to_string())
                    .and_modify(|existing| {
                        existing.push_str(", ");
                        existing.push_str(value);
                    })
                    .or_insert_with(|| value.to_string());
            }
            Err(_) => errors.push(format!("{name}: value is not visible ASCII")),
        }
    }

    if errors.is_empty() {
        Ok(map)
    } else {
        Err(errors)
    }
}
