//! Hypermedia links.
//!
//! [`ResourceLinks`] maps a relation name to either a bare URL or a link
//! object, and serializes to the HAL `_links` shape:
//!
//! ```json
//! {
//!   "self": "/documents/7",
//!   "search": { "href": "/documents{?q}", "templated": true }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A link object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target URL or URI template.
    pub href: String,
    /// Whether `href` is a URI template.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub templated: bool,
    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    /// Creates a plain link object.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: false,
            title: None,
        }
    }

    /// Creates a templated link object.
    pub fn templated(href: impl Into<String>) -> Self {
        Self {
            templated: true,
            ..Self::new(href)
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// One relation's target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkValue {
    /// A bare URL.
    Href(String),
    /// A link object.
    Object(Link),
}

impl LinkValue {
    /// Returns the target URL.
    pub fn href(&self) -> &str {
        match self {
            Self::Href(href) => href,
            Self::Object(link) => &link.href,
        }
    }
}

impl From<&str> for LinkValue {
    fn from(href: &str) -> Self {
        Self::Href(href.to_string())
    }
}

impl From<String> for LinkValue {
    fn from(href: String) -> Self {
        Self::Href(href)
    }
}

impl From<Link> for LinkValue {
    fn from(link: Link) -> Self {
        Self::Object(link)
    }
}

/// Relation name to link, in insertion order.
///
/// # Example
///
/// ```
/// use hypatia_response::{Link, ResourceLinks};
///
/// let links = ResourceLinks::new()
///     .with("self", "/documents/7")
///     .with("search", Link::templated("/documents{?q}"));
///
/// assert_eq!(links.get("self").unwrap().href(), "/documents/7");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLinks(IndexMap<String, LinkValue>);

impl ResourceLinks {
    /// Creates an empty link set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a relation, replacing any previous target.
    #[must_use]
    pub fn with(mut self, rel: impl Into<String>, link: impl Into<LinkValue>) -> Self {
        self.insert(rel, link);
        self
    }

    /// Adds a relation, returning the previous target.
    pub fn insert(&mut self, rel: impl Into<String>, link: impl Into<LinkValue>) -> Option<LinkValue> {
        self.0.insert(rel.into(), link.into())
    }

    /// Returns a relation's target.
    pub fn get(&self, rel: &str) -> Option<&LinkValue> {
        self.0.get(rel)
    }

    /// Returns true if there are no relations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of relations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over relations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkValue)> {
        self.0.iter().map(|(rel, link)| (rel.as_str(), link))
    }
}

impl<K: Into<String>, V: Into<LinkValue>> FromIterator<(K, V)> for ResourceLinks {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
