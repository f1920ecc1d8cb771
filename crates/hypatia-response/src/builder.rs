//! Response construction.
//!
//! [`create_response`] projects a context and a payload onto a wire
//! response. It reads the status and headers the pipeline has set on the
//! context but never changes them, so building a response twice from the
//! same context yields the same result.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE, VARY};
use http_body_util::Full;
use hypatia_core::{Context, KernelError, Response};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ResponseError;
use crate::links::ResourceLinks;
use crate::media::{negotiate, MediaType};
use crate::render::{AppRenderer, HtmlRenderer, SharedRenderer};

/// Key under which links are attached.
pub const LINKS_KEY: &str = "_links";
/// Key under which embedded resources are attached.
pub const EMBEDDED_KEY: &str = "_embedded";
/// Key wrapping non-object payloads that carry an envelope.
pub const DATA_KEY: &str = "data";

/// App-wide response defaults, stored on each context by the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseSettings {
    /// Representation used when the client expresses no preference.
    pub default_media_type: MediaType,
    /// Pretty-print JSON bodies.
    pub pretty_json: bool,
}

impl ResponseSettings {
    fn from_context(ctx: &Context) -> Self {
        ctx.get_extension::<Self>().copied().unwrap_or_default()
    }
}

/// Per-response options.
///
/// # Example
///
/// ```
/// use hypatia_response::{MediaType, ResourceLinks, ResponseOptions};
///
/// let options = ResponseOptions::new()
///     .links(ResourceLinks::new().with("self", "/documents/7"))
///     .media_type(MediaType::HalJson);
/// # let _ = options;
/// ```
#[derive(Clone, Default)]
pub struct ResponseOptions {
    links: Option<ResourceLinks>,
    embedded: Option<Map<String, Value>>,
    embed_failure: Option<(String, String)>,
    media_type: Option<MediaType>,
    template: Option<String>,
    renderer: Option<SharedRenderer>,
}

impl ResponseOptions {
    /// Creates empty options: negotiated media type, no envelope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `_links`.
    #[must_use]
    pub fn links(mut self, links: ResourceLinks) -> Self {
        self.links = Some(links);
        self
    }

    /// Attaches one embedded resource (or list) under `rel`.
    ///
    /// A resource that fails to serialize makes [`create_response`] return
    /// [`ResponseError::Embed`].
    #[must_use]
    pub fn embed(mut self, rel: impl Into<String>, resource: impl Serialize) -> Self {
        let rel = rel.into();
        match serde_json::to_value(resource) {
            Ok(value) => {
                self.embedded.get_or_insert_with(Map::new).insert(rel, value);
            }
            Err(error) => {
                if self.embed_failure.is_none() {
                    self.embed_failure = Some((rel, error.to_string()));
                }
            }
        }
        self
    }

    /// Replaces all embedded resources.
    #[must_use]
    pub fn embedded(mut self, embedded: Map<String, Value>) -> Self {
        self.embedded = Some(embedded);
        self
    }

    /// Forces a media type instead of negotiating.
    #[must_use]
    pub fn media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    /// Names the HTML template.
    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Uses `renderer` for this response instead of the app-wide one.
    #[must_use]
    pub fn renderer(mut self, renderer: impl HtmlRenderer) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Uses an already shared renderer.
    #[must_use]
    pub fn shared_renderer(mut self, renderer: SharedRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }
}

impl std::fmt::Debug for ResponseOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseOptions")
            .field("links", &self.links)
            .field("embedded", &self.embedded)
            .field("embed_failure", &self.embed_failure)
            .field("media_type", &self.media_type)
            .field("template", &self.template)
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

/// Builds the wire response for `data`.
///
/// The payload is serialized to JSON. When links or embedded resources are
/// given they are merged in as `_links` and `_embedded`; a payload that is
/// not a JSON object is first wrapped as `{"data": ...}`.
///
/// The media type is `options.media_type` when set, otherwise negotiated
/// from the request's `Accept` header, in which case `Vary: Accept` is
/// added. HTML is rendered by the options' renderer or the app-wide one.
///
/// # Errors
///
/// Fails when the payload or an embedded resource cannot be serialized,
/// when HTML is forced without a renderer, or when the renderer fails.
pub fn create_response<T>(ctx: &Context, data: &T, options: ResponseOptions) -> Result<Response, ResponseError>
where
    T: Serialize + ?Sized,
{
    if let Some((rel, message)) = options.embed_failure {
        return Err(ResponseError::Embed { rel, message });
    }
    let settings = ResponseSettings::from_context(ctx);
    let renderer = options.renderer.or_else(|| AppRenderer::from_context(ctx));
    let payload = attach_envelope(serde_json::to_value(data)?, options.links, options.embedded)?;

    let (media_type, negotiated) = match options.media_type {
        Some(MediaType::Html) if renderer.is_none() => return Err(ResponseError::RendererMissing),
        Some(media_type) => (media_type, false),
        None => (
            negotiate(
                ctx.request_header("accept"),
                renderer.is_some(),
                settings.default_media_type,
            ),
            true,
        ),
    };

    let body = match (media_type, &renderer) {
        (MediaType::Html, Some(renderer)) => {
            Bytes::from(renderer.render(options.template.as_deref(), &payload)?)
        }
        _ if settings.pretty_json => Bytes::from(serde_json::to_vec_pretty(&payload)?),
        _ => Bytes::from(serde_json::to_vec(&payload)?),
    };

    let mut response = http::Response::new(Full::new(body));
    *response.status_mut() = ctx.status();
    *response.headers_mut() = ctx.headers().clone();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(media_type.content_type()));
    if negotiated {
        response
            .headers_mut()
            .append(VARY, HeaderValue::from_static("accept"));
    }

    tracing::trace!(
        request_id = %ctx.request_id(),
        media_type = %media_type,
        negotiated,
        "Built response"
    );
    Ok(response)
}

/// Builds a response with [`create_response`] and stores it on `ctx`.
///
/// Returns whether the response was stored; an existing response is kept.
pub fn respond_with<T>(ctx: &mut Context, data: &T, options: ResponseOptions) -> Result<bool, ResponseError>
where
    T: Serialize + ?Sized,
{
    let response = create_response(ctx, data, options)?;
    Ok(ctx.respond(response))
}

/// Builds the 400 response for rejected input.
///
/// The body is the standard error envelope with one `details` entry per
/// validation error and the request id for correlation.
#[must_use]
pub fn validation_error_response(ctx: &Context, errors: &[String]) -> Response {
    let error = KernelError::validation_with_details("request validation failed", errors.to_vec());
    let mut response = error.to_response(Some(&ctx.request_id().to_string()));
    for (name, value) in ctx.headers() {
        if !response.headers().contains_key(name) {
            response.headers_mut().insert(name.clone(), value.clone());
        }
    }
    response
}

fn attach_envelope(
    payload: Value,
    links: Option<ResourceLinks>,
    embedded: Option<Map<String, Value>>,
) -> Result<Value, ResponseError> {
    if links.is_none() && embedded.is_none() {
        return Ok(payload);
    }

    let mut object = match payload {
        Value::Object(object) => object,
        Value::Null => Map::new(),
        other => {
            let mut object = Map::new();
            object.insert(DATA_KEY.to_string(), other);
            object
        }
    };
    if let Some(links) = links {
        object.insert(LINKS_KEY.to_string(), serde_json::to_value(links)?);
    }
    if let Some(embedded) = embedded {
        object.insert(EMBEDDED_KEY.to_string(), Value::Object(embedded));
    }
    Ok(Value::Object(object))
}
