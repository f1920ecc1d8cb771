//! Media types and `Accept` negotiation.

use std::fmt;
use std::str::FromStr;

use mime::Mime;
use serde::{Deserialize, Serialize};

/// A representation the response builder can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MediaType {
    /// `application/json`
    #[default]
    #[serde(rename = "application/json")]
    Json,
    /// `application/hal+json`
    #[serde(rename = "application/hal+json")]
    HalJson,
    /// `text/html`
    #[serde(rename = "text/html")]
    Html,
}

impl MediaType {
    /// Returns the media type essence.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::HalJson => "application/hal+json",
            Self::Html => "text/html",
        }
    }

    /// Returns the `Content-Type` header value.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::HalJson => "application/hal+json",
            Self::Html => "text/html; charset=utf-8",
        }
    }

    /// Returns true for the JSON representations.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::HalJson)
    }

    fn from_mime(mime: &Mime) -> Option<Self> {
        match mime.essence_str() {
            "application/json" => Some(Self::Json),
            "application/hal+json" => Some(Self::HalJson),
            "text/html" => Some(Self::Html),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported media type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported media type '{0}'")]
pub struct UnsupportedMediaType(pub String);

impl FromStr for MediaType {
    type Err = UnsupportedMediaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Mime>()
            .ok()
            .and_then(|mime| Self::from_mime(&mime))
            .ok_or_else(|| UnsupportedMediaType(s.to_string()))
    }
}

/// One entry of an `Accept` header.
#[derive(Debug, Clone)]
struct AcceptEntry {
    mime: Mime,
    quality: f32,
}

fn parse_accept(header: &str) -> Vec<AcceptEntry> {
    let mut entries: Vec<AcceptEntry> = header
        .split(',')
        .filter_map(|part| part.trim().parse::<Mime>().ok())
        .map(|mime| {
            let quality = mime
                .get_param("q")
                .and_then(|q| q.as_str().parse::<f32>().ok())
                .map_or(1.0, |q| q.clamp(0.0, 1.0));
            AcceptEntry { mime, quality }
        })
        .collect();
    // Stable, so equal weights keep header order.
    entries.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    entries
}

/// Picks the representation for an `Accept` header.
///
/// Entries are tried by descending quality, then header order. Wildcards
/// resolve to `default` when it fits (`*/*`, or `application/*` for a JSON
/// default) and otherwise to the first acceptable candidate. HTML is only
/// a candidate when `html_available` is set. Types refused with `q=0` are
/// never chosen.
///
/// A missing or empty header, or one that names nothing we can produce,
/// yields `default` (or JSON when `default` is HTML and HTML is
/// unavailable).
///
/// # Example
///
/// ```
/// use hypatia_response::{negotiate, MediaType};
///
/// let picked = negotiate(Some("text/html;q=0.5, application/hal+json"), true, MediaType::Json);
/// assert_eq!(picked, MediaType::HalJson);
///
/// let picked = negotiate(Some("text/html"), false, MediaType::Json);
/// assert_eq!(picked, MediaType::Json);
/// ```
#[must_use]
pub fn negotiate(accept: Option<&str>, html_available: bool, default: MediaType) -> MediaType {
    let fallback = if default == MediaType::Html && !html_available {
        MediaType::Json
    } else {
        default
    };

    let Some(header) = accept.filter(|h| !h.trim().is_empty()) else {
        return fallback;
    };

    let entries = parse_accept(header);
    let refused: Vec<MediaType> = entries
        .iter()
        .filter(|e| e.quality <= 0.0)
        .filter_map(|e| MediaType::from_mime(&e.mime))
        .collect();

    let usable = |media: MediaType| {
        (media != MediaType::Html || html_available) && !refused.contains(&media)
    };

    let mut candidates = vec![fallback, MediaType::Json, MediaType::HalJson];
    if html_available {
        candidates.push(MediaType::Html);
    }

    for entry in entries.iter().filter(|e| e.quality > 0.0) {
        let picked = if entry.mime.type_() == mime::STAR {
            candidates.iter().copied().find(|m| usable(*m))
        } else if entry.mime.subtype() == mime::STAR {
            candidates
                .iter()
                .copied()
                .find(|m| usable(*m) && m.as_str().starts_with(entry.mime.type_().as_str()))
        } else {
            MediaType::from_mime(&entry.mime).filter(|m| usable(*m))
        };

        if let Some(media) = picked {
            return media;
        }
    }

    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_media_type() {
        assert_eq!("application/json".parse(), Ok(MediaType::Json));
        assert_eq!("application/hal+json".parse(), Ok(MediaType::HalJson));
        assert_eq!("text/html; charset=utf-8".parse(), Ok(MediaType::Html));
        assert!("image/png".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_missing_accept_uses_default() {
        assert_eq!(negotiate(None, true, MediaType::HalJson), MediaType::HalJson);
        assert_eq!(negotiate(Some("  "), true, MediaType::Json), MediaType::Json);
    }

    #[test]
    fn test_html_default_without_renderer_falls_back_to_json() {
        assert_eq!(negotiate(None, false, MediaType::Html), MediaType::Json);
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(negotiate(Some("text/html"), true, MediaType::Json), MediaType::Html);
        assert_eq!(
            negotiate(Some("application/hal+json"), false, MediaType::Json),
            MediaType::HalJson
        );
    }

    #[test]
    fn test_html_requires_renderer() {
        assert_eq!(
            negotiate(Some("text/html, application/hal+json;q=0.8"), false, MediaType::Json),
            MediaType::HalJson
        );
    }

    #[test]
    fn test_quality_ordering() {
        assert_eq!(
            negotiate(
                Some("application/json;q=0.4, text/html;q=0.9"),
                true,
                MediaType::Json
            ),
            MediaType::Html
        );
    }

    #[test]
    fn test_equal_quality_keeps_header_order() {
        assert_eq!(
            negotiate(Some("application/hal+json, application/json"), false, MediaType::Json),
            MediaType::HalJson
        );
    }

    #[test]
    fn test_wildcards() {
        assert_eq!(negotiate(Some("*/*"), true, MediaType::HalJson), MediaType::HalJson);
        assert_eq!(negotiate(Some("text/*"), true, MediaType::Json), MediaType::Html);
        assert_eq!(negotiate(Some("text/*"), false, MediaType::Json), MediaType::Json);
        assert_eq!(
            negotiate(Some("application/*"), true, MediaType::Html),
            MediaType::Json
        );
    }

    #[test]
    fn test_refused_types_are_skipped() {
        assert_eq!(
            negotiate(Some("application/json;q=0, */*"), false, MediaType::Json),
            MediaType::HalJson
        );
    }

    #[test]
    fn test_browser_accept_header() {
        let accept = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
        assert_eq!(negotiate(Some(accept), true, MediaType::Json), MediaType::Html);
        assert_eq!(negotiate(Some(accept), false, MediaType::Json), MediaType::Json);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&MediaType::HalJson).unwrap(),
            r#""application/hal+json""#
        );
        let parsed: MediaType = serde_json::from_str(r#""text/html""#).unwrap();
        assert_eq!(parsed, MediaType::Html);
    }
}
