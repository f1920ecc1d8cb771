//! # Hypatia Response
//!
//! Hypermedia responses for the Hypatia request kernel.
//!
//! - [`ResourceLinks`] describe related and actionable resources (`_links`)
//! - [`negotiate`] picks JSON, HAL+JSON or HTML from an `Accept` header
//! - [`create_response`] turns a context and a payload into a wire response
//! - [`HtmlRenderer`] is the seam for an external template engine
//!
//! ## Example
//!
//! ```
//! use hypatia_core::Context;
//! use hypatia_response::{create_response, ResourceLinks, ResponseOptions};
//! use http::{Method, Uri};
//! use serde_json::json;
//!
//! let ctx = Context::new(Method::GET, Uri::from_static("/documents/7"));
//! let response = create_response(
//!     &ctx,
//!     &json!({"id": 7, "title": "Notes"}),
//!     ResponseOptions::new().links(ResourceLinks::new().with("self", "/documents/7")),
//! )
//! .unwrap();
//!
//! assert_eq!(response.headers()["content-type"], "application/json");
//! ```

mod builder;
mod error;
mod links;
mod media;
mod render;

pub use builder::{
    create_response, respond_with, validation_error_response, ResponseOptions, ResponseSettings,
    DATA_KEY, EMBEDDED_KEY, LINKS_KEY,
};
pub use error::ResponseError;
pub use links::{Link, LinkValue, ResourceLinks};
pub use media::{negotiate, MediaType, UnsupportedMediaType};
pub use render::{AppRenderer, FnRenderer, HtmlRenderer, SharedRenderer};
