//! Path pattern compilation and matching.
//!
//! A pattern is a `/`-separated list of segments:
//!
//! - literal segments (`products`) match themselves exactly
//! - `:name` or `{name}` capture one segment
//! - a trailing `*` or `*name` captures the remaining path (possibly empty)
//!
//! Empty segments are ignored on both sides, so `/products/` and
//! `/products` are the same path.

use std::collections::HashSet;

use crate::error::RouteError;
use crate::params::Params;

/// Name used for an unnamed trailing wildcard.
pub const WILDCARD_PARAM: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard(String),
}

/// A compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] when a parameter has no name,
    /// a brace is unbalanced, a wildcard is not the last segment, or a
    /// parameter name is used twice.
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        if !pattern.starts_with('/') {
            return Err(RouteError::invalid(pattern, "must start with '/'"));
        }

        let raw_segments: Vec<&str> = split_segments(pattern).collect();
        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut seen = HashSet::new();

        for (index, raw) in raw_segments.iter().enumerate() {
            let segment = if let Some(name) = raw.strip_prefix(':') {
                Segment::Param(param_name(pattern, name)?)
            } else if let Some(inner) = raw.strip_prefix('{') {
                let name = inner
                    .strip_suffix('}')
                    .ok_or_else(|| RouteError::invalid(pattern, "unclosed '{'"))?;
                Segment::Param(param_name(pattern, name)?)
            } else if let Some(name) = raw.strip_prefix('*') {
                if index + 1 != raw_segments.len() {
                    return Err(RouteError::invalid(
                        pattern,
                        "wildcard must be the last segment",
                    ));
                }
                let name = if name.is_empty() { WILDCARD_PARAM } else { name };
                Segment::Wildcard(name.to_string())
            } else if raw.contains('{') || raw.contains('}') {
                return Err(RouteError::invalid(
                    pattern,
                    "braces must wrap a whole segment",
                ));
            } else {
                Segment::Literal((*raw).to_string())
            };

            if let Segment::Param(name) | Segment::Wildcard(name) = &segment {
                if !seen.insert(name.clone()) {
                    return Err(RouteError::invalid(
                        pattern,
                        format!("duplicate parameter '{name}'"),
                    ));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Returns the pattern as registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if both patterns match exactly the same paths and
    /// capture them under the same names. Trailing slashes and the
    /// `:name`/`{name}` spelling do not matter.
    pub(crate) fn same_route(&self, other: &Self) -> bool {
        self.segments == other.segments
    }

    /// Returns true if the pattern has no parameters or wildcard.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Returns the parameter names in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::Wildcard(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Matches a request path, returning the captured parameters.
    ///
    /// Captured values are percent-decoded; a value that does not decode
    /// to UTF-8 is kept as sent.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Params> {
        let parts: Vec<&str> = split_segments(path).collect();
        let mut params = Params::new();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Wildcard(name) => {
                    let rest = parts.get(index..).unwrap_or_default().join("/");
                    params.push(name.as_str(), decode(&rest));
                    return Some(params);
                }
                Segment::Literal(literal) => {
                    if parts.get(index) != Some(&literal.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(index)?;
                    params.push(name.as_str(), decode(value));
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Normalizes a path: empty segments are dropped and the result always
/// starts with `/` and never ends with one (except the root).
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in split_segments(path) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn param_name(pattern: &str, name: &str) -> Result<String, RouteError> {
    if name.is_empty() {
        return Err(RouteError::invalid(pattern, "parameter without a name"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(RouteError::invalid(
            pattern,
            format!("invalid parameter name '{name}'"),
        ));
    }
    Ok(name.to_string())
}

fn decode(value: &str) -> String {
    urlencoding::decode(value).map_or_else(|_| value.to_string(), |v| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_static_pattern() {
        let pattern = PathPattern::parse("/products/featured").unwrap();
        assert!(pattern.is_static());
        assert_eq!(pattern.as_str(), "/products/featured");
        assert_eq!(pattern.param_names().count(), 0);
    }

    #[test]
    fn test_colon_and_brace_params_are_equivalent() {
        let colon = PathPattern::parse("/users/:id").unwrap();
        let brace = PathPattern::parse("/users/{id}").unwrap();

        assert_eq!(colon.matches("/users/42"), brace.matches("/users/42"));
        assert_eq!(colon.matches("/users/42").unwrap().get("id"), Some("42"));
    }

    #[test]
    fn test_match_multiple_params() {
        let pattern = PathPattern::parse("/users/:user_id/posts/:post_id").unwrap();
        let params = pattern.matches("/users/1/posts/2").unwrap();

        assert_eq!(params.get("user_id"), Some("1"));
        assert_eq!(params.get("post_id"), Some("2"));
    }

    #[test]
    fn test_segment_count_must_match() {
        let pattern = PathPattern::parse("/users/:id").unwrap();
        assert!(pattern.matches("/users").is_none());
        assert!(pattern.matches("/users/1/extra").is_none());
        assert!(pattern.matches("/people/1").is_none());
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let pattern = PathPattern::parse("/users/:id/").unwrap();
        assert!(pattern.matches("/users/5").is_some());
        assert!(pattern.matches("/users/5/").is_some());
    }

    #[test]
    fn test_wildcard_captures_rest() {
        let pattern = PathPattern::parse("/files/*path").unwrap();

        let params = pattern.matches("/files/a/b/c.txt").unwrap();
        assert_eq!(params.get("path"), Some("a/b/c.txt"));

        let params = pattern.matches("/files").unwrap();
        assert_eq!(params.get("path"), Some(""));
    }

    #[test]
    fn test_unnamed_wildcard() {
        let pattern = PathPattern::parse("/static/*").unwrap();
        let params = pattern.matches("/static/css/site.css").unwrap();
        assert_eq!(params.get(WILDCARD_PARAM), Some("css/site.css"));
    }

    #[test]
    fn test_params_are_percent_decoded() {
        let pattern = PathPattern::parse("/tags/:name").unwrap();
        let params = pattern.matches("/tags/rust%20lang").unwrap();
        assert_eq!(params.get("name"), Some("rust lang"));
    }

    #[test]
    fn test_invalid_patterns() {
        for bad in [
            "users",
            "/users/:",
            "/users/{}",
            "/users/{id",
            "/users/x{id}",
            "/files/*/more",
            "/a/:id/b/:id",
            "/a/:bad.name",
        ] {
            let err = PathPattern::parse(bad).unwrap_err();
            assert!(
                matches!(err, RouteError::InvalidPattern { .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/products/"), "/products");
        assert_eq!(normalize_path("//products//featured"), "/products/featured");
    }
}
