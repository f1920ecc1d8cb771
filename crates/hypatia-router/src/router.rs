//! Two-tier router.
//!
//! Routes are collected with a [`RouterBuilder`] and frozen into a
//! [`Router`]. Lookups consult an exact-match table of static paths first
//! and only then walk the dynamic patterns in registration order.

use std::collections::HashMap;

use http::Method;

use crate::error::RouteError;
use crate::params::Params;
use crate::pattern::{normalize_path, PathPattern};

/// What to do when the same static method and path is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The later registration replaces the earlier one.
    #[default]
    Overwrite,
    /// The later registration fails with [`RouteError::Duplicate`].
    Reject,
}

#[derive(Debug, Clone)]
struct DynamicRoute<T> {
    method: Method,
    pattern: PathPattern,
    value: T,
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the route.
    pub value: &'a T,
    /// Captured path parameters (empty for static routes).
    pub params: Params,
    /// The pattern that matched, as registered (normalized for static routes).
    pub pattern: &'a str,
}

/// The outcome of [`Router::match_route`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome<'a, T> {
    /// A route matched.
    Matched(RouteMatch<'a, T>),
    /// No route matched the method and path.
    NotFound,
}

impl<'a, T> RouteOutcome<'a, T> {
    /// Converts the outcome into an `Option`.
    pub fn into_match(self) -> Option<RouteMatch<'a, T>> {
        match self {
            Self::Matched(m) => Some(m),
            Self::NotFound => None,
        }
    }

    /// Returns true if a route matched.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Collects routes before they are frozen into a [`Router`].
///
/// # Example
///
/// ```rust
/// use hypatia_router::{RouteOutcome, RouterBuilder};
/// use http::Method;
///
/// let mut builder = RouterBuilder::new();
/// builder.insert(Method::GET, "/products/:id", "show").unwrap();
/// builder.insert(Method::GET, "/products/featured", "featured").unwrap();
/// let router = builder.build();
///
/// match router.match_route(&Method::GET, "/products/featured") {
///     RouteOutcome::Matched(m) => assert_eq!(*m.value, "featured"),
///     RouteOutcome::NotFound => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RouterBuilder<T> {
    static_routes: HashMap<Method, HashMap<String, T>>,
    dynamic_routes: Vec<DynamicRoute<T>>,
    policy: DuplicatePolicy,
}

impl<T> Default for RouterBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouterBuilder<T> {
    /// Creates an empty builder with [`DuplicatePolicy::Overwrite`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            static_routes: HashMap::new(),
            dynamic_routes: Vec::new(),
            policy: DuplicatePolicy::default(),
        }
    }

    /// Sets the duplicate-route policy for subsequent insertions.
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Registers a route.
    ///
    /// Patterns without parameters go into the static table keyed by their
    /// normalized path. Everything else is appended to the dynamic list,
    /// where earlier registrations win.
    pub fn insert(&mut self, method: Method, path: &str, value: T) -> Result<(), RouteError> {
        let pattern = PathPattern::parse(path)?;

        if pattern.is_static() {
            let key = normalize_path(path);
            let table = self.static_routes.entry(method.clone()).or_default();
            if table.contains_key(&key) {
                if self.policy == DuplicatePolicy::Reject {
                    return Err(RouteError::Duplicate { method, path: key });
                }
                tracing::debug!(method = %method, path = %key, "overwriting static route");
            }
            table.insert(key, value);
        } else {
            if self.policy == DuplicatePolicy::Reject
                && self
                    .dynamic_routes
                    .iter()
                    .any(|r| r.method == method && r.pattern.same_route(&pattern))
            {
                return Err(RouteError::Duplicate {
                    method,
                    path: normalize_path(path),
                });
            }
            self.dynamic_routes.push(DynamicRoute {
                method,
                pattern,
                value,
            });
        }
        Ok(())
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.static_routes.values().map(HashMap::len).sum::<usize>() + self.dynamic_routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the route set.
    #[must_use]
    pub fn build(self) -> Router<T> {
        Router {
            static_routes: self.static_routes,
            dynamic_routes: self.dynamic_routes,
        }
    }
}

/// An immutable route table.
#[derive(Debug, Clone)]
pub struct Router<T> {
    static_routes: HashMap<Method, HashMap<String, T>>,
    dynamic_routes: Vec<DynamicRoute<T>>,
}

impl<T> Router<T> {
    /// Looks up the route for a method and path.
    ///
    /// Static routes always take precedence over dynamic ones, whatever
    /// order they were registered in.
    pub fn match_route(&self, method: &Method, path: &str) -> RouteOutcome<'_, T> {
        let key = normalize_path(path);

        if let Some((pattern, value)) = self
            .static_routes
            .get(method)
            .and_then(|table| table.get_key_value(&key))
        {
            return RouteOutcome::Matched(RouteMatch {
                value,
                params: Params::new(),
                pattern,
            });
        }

        self.dynamic_routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                route.pattern.matches(&key).map(|params| RouteMatch {
                    value: &route.value,
                    params,
                    pattern: route.pattern.as_str(),
                })
            })
            .map_or(RouteOutcome::NotFound, RouteOutcome::Matched)
    }

    /// Returns the methods that have a route for `path`, sorted by name.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let key = normalize_path(path);
        let mut methods: Vec<Method> = self
            .static_routes
            .iter()
            .filter(|(_, table)| table.contains_key(&key))
            .map(|(method, _)| method.clone())
            .chain(
                self.dynamic_routes
                    .iter()
                    .filter(|route| route.pattern.matches(&key).is_some())
                    .map(|route| route.method.clone()),
            )
            .collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods.dedup();
        methods
    }

    /// Returns every registered route as `(method, pattern)`.
    ///
    /// Static routes come first (in no particular order), then dynamic
    /// routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.static_routes
            .iter()
            .flat_map(|(method, table)| table.keys().map(move |path| (method, path.as_str())))
            .chain(
                self.dynamic_routes
                    .iter()
                    .map(|route| (&route.method, route.pattern.as_str())),
            )
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.static_routes.values().map(HashMap::len).sum::<usize>() + self.dynamic_routes.len()
    }

    /// Returns true if the router has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
