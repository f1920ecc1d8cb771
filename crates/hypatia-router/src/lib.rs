//! # Hypatia Router
//!
//! Path routing for the Hypatia request kernel.
//!
//! Routes are registered on a [`RouterBuilder`] and frozen into a
//! [`Router`] before serving. Lookup is two-tiered:
//!
//! 1. an exact-match table of static paths, per method
//! 2. an ordered list of parameterized patterns, first match wins
//!
//! A static path always beats a pattern, regardless of registration order.
//!
//! ## Pattern syntax
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `/users` | literal segment |
//! | `/users/:id` or `/users/{id}` | one captured segment |
//! | `/files/*path` or `/files/*` | the rest of the path |
//!
//! Trailing slashes and repeated slashes are ignored.
//!
//! ## Example
//!
//! ```rust
//! use hypatia_router::RouterBuilder;
//! use http::Method;
//!
//! let mut builder = RouterBuilder::new();
//! builder.insert(Method::GET, "/users/:id", "getUser").unwrap();
//! let router = builder.build();
//!
//! let found = router.match_route(&Method::GET, "/users/123").into_match().unwrap();
//! assert_eq!(*found.value, "getUser");
//! assert_eq!(found.params.get("id"), Some("123"));
//! ```

mod error;
mod params;
mod pattern;
mod router;

pub use error::RouteError;
pub use params::Params;
pub use pattern::{normalize_path, PathPattern, WILDCARD_PARAM};
pub use router::{DuplicatePolicy, RouteMatch, RouteOutcome, Router, RouterBuilder};
