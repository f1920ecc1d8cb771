//! Per-request context.
//!
//! A [`Context`] is created once per request by the
//! [`ContextBuilder`](crate::ContextBuilder), handed by mutable reference
//! through the middleware chain into the handler, and dropped once the
//! response has been emitted. It is never shared between requests.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, Uri};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::types::Response;
use crate::validation::{validate, JsonSchema, Schema, StringMap, Validation};

/// The header used to carry the request correlation identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it suitable for log correlation.
///
/// # Example
///
/// ```
/// use hypatia_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parses a request ID from its hyphenated string form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// The four independent validation outcomes attached to every request.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    /// Parsed request body (`null` when the request carries none).
    pub body: Validation<Value>,
    /// Path parameters, filled in once the route is resolved.
    pub params: Validation<StringMap>,
    /// Query string parameters.
    pub query: Validation<StringMap>,
    /// Request headers, keyed by lowercase name.
    pub headers: Validation<StringMap>,
}

impl Default for Validated {
    fn default() -> Self {
        Self {
            body: Ok(Value::Null),
            params: Ok(StringMap::new()),
            query: Ok(StringMap::new()),
            headers: Ok(StringMap::new()),
        }
    }
}

impl Validated {
    /// Returns true when all four outcomes succeeded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.body.is_ok() && self.params.is_ok() && self.query.is_ok() && self.headers.is_ok()
    }

    /// Collects every error, prefixed by the part of the request it came from.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        let parts: [(&str, Option<&Vec<String>>); 4] = [
            ("body", self.body.as_ref().err()),
            ("params", self.params.as_ref().err()),
            ("query", self.query.as_ref().err()),
            ("headers", self.headers.as_ref().err()),
        ];

        parts
            .into_iter()
            .filter_map(|(part, errors)| errors.map(|errors| (part, errors)))
            .flat_map(|(part, errors)| errors.iter().map(move |e| format!("{part}: {e}")))
            .collect()
    }
}

/// Per-request mutable carrier of request data, validation results, and the
/// eventual response.
///
/// Only the status, response headers, state bag, extensions and response slot
/// change while the request is processed; the request side is fixed once the
/// builder hands the context over.
///
/// # Example
///
/// ```
/// use hypatia_core::{Context, Response, ResponseExt};
/// use http::{Method, StatusCode};
///
/// let mut ctx = Context::new(Method::GET, "/products".parse().unwrap());
/// assert!(ctx.respond(Response::empty(StatusCode::OK)));
///
/// // A second respond does not overwrite the first response.
/// assert!(!ctx.respond(Response::empty(StatusCode::CREATED)));
/// assert_eq!(ctx.response().unwrap().status(), StatusCode::OK);
/// ```
#[derive(Debug)]
pub struct Context {
    request_id: RequestId,
    method: Method,
    uri: Uri,
    request_headers: HeaderMap,
    raw_body: Bytes,
    status: StatusCode,
    headers: HeaderMap,
    state: Map<String, Value>,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    response: Option<Response>,
    validated: Validated,
    started_at: Instant,
}

impl Context {
    /// Creates a context for a body-less request with empty validation
    /// results.
    ///
    /// Requests arriving over the wire go through
    /// [`ContextBuilder`](crate::ContextBuilder) instead.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self::from_parts(
            RequestId::new(),
            method,
            uri,
            HeaderMap::new(),
            Bytes::new(),
            Validated::default(),
        )
    }

    pub(crate) fn from_parts(
        request_id: RequestId,
        method: Method,
        uri: Uri,
        request_headers: HeaderMap,
        raw_body: Bytes,
        validated: Validated,
    ) -> Self {
        Self {
            request_id,
            method,
            uri,
            request_headers,
            raw_body,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            state: Map::new(),
            extensions: HashMap::new(),
            response: None,
            validated,
            started_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the raw request headers.
    #[must_use]
    pub const fn request_headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    /// Returns a request header as a string, if present and valid UTF-8.
    #[must_use]
    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request_headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    /// Returns the raw request body bytes.
    #[must_use]
    pub const fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    /// Returns the response status that builders will use.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the response status.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Returns the response headers collected so far.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the response headers for modification.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the validation results.
    #[must_use]
    pub const fn validated(&self) -> &Validated {
        &self.validated
    }

    /// Replaces the path parameters once the route is resolved.
    pub fn set_params(&mut self, params: StringMap) {
        self.validated.params = Ok(params);
    }

    /// Returns a path parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.validated
            .params
            .as_ref()
            .ok()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }

    /// Returns a query parameter, if the query string validated.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.validated
            .query
            .as_ref()
            .ok()
            .and_then(|query| query.get(name))
            .map(String::as_str)
    }

    /// Deserializes the validated body into `T`.
    ///
    /// Returns the body errors unchanged if the body itself failed to parse.
    pub fn body_as<T: DeserializeOwned>(&self) -> Validation<T> {
        self.validate_body(&JsonSchema::<T>::new())
    }

    /// Runs `schema` against the validated body.
    pub fn validate_body<S: Schema + ?Sized>(&self, schema: &S) -> Validation<S::Output> {
        match &self.validated.body {
            Ok(body) => validate(schema, body),
            Err(errors) => Err(errors.clone()),
        }
    }

    /// Returns a value from the untyped state bag.
    #[must_use]
    pub fn state(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Stores a value in the untyped state bag, returning any previous value.
    pub fn set_state(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.state.insert(key.into(), value)
    }

    /// Removes a value from the untyped state bag.
    pub fn remove_state(&mut self, key: &str) -> Option<Value> {
        self.state.remove(key)
    }

    /// Stores a typed extension value.
    ///
    /// # Example
    ///
    /// ```
    /// use hypatia_core::Context;
    /// use http::Method;
    ///
    /// #[derive(Clone)]
    /// struct CartId(u64);
    ///
    /// let mut ctx = Context::new(Method::GET, "/cart".parse().unwrap());
    /// ctx.set_extension(CartId(7));
    /// assert_eq!(ctx.get_extension::<CartId>().unwrap().0, 7);
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }

    /// Returns the response, if one has been set.
    #[must_use]
    pub const fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Returns the response for in-place edits such as adding headers.
    pub fn response_mut(&mut self) -> Option<&mut Response> {
        self.response.as_mut()
    }

    /// Returns true once a response has been set.
    #[must_use]
    pub const fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// Sets the response if the slot is still empty.
    ///
    /// Returns `false` and drops `response` when a response was already set.
    /// Use [`replace_response`](Self::replace_response) to overwrite.
    pub fn respond(&mut self, response: Response) -> bool {
        if self.response.is_some() {
            tracing::debug!(
                request_id = %self.request_id,
                status = %response.status(),
                "Response already set, ignoring new response"
            );
            return false;
        }
        self.response = Some(response);
        true
    }

    /// Overwrites the response, returning the previous one.
    pub fn replace_response(&mut self, response: Response) -> Option<Response> {
        self.response.replace(response)
    }

    /// Removes the response from the context.
    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }

    /// Returns the elapsed time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}
