//! Verb and path pairs.

use http::Method;
use indexmap::Equivalent;
use std::fmt;

/// The verb and exact path an action answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    method: Method,
    path: String,
}

impl Route {
    /// Creates a route.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Borrowed lookup key, hashing exactly like [`Route`].
#[derive(Debug, Hash)]
pub(crate) struct RouteRef<'a> {
    method: &'a Method,
    path: &'a str,
}

impl<'a> RouteRef<'a> {
    pub(crate) const fn new(method: &'a Method, path: &'a str) -> Self {
        Self { method, path }
    }
}

impl Equivalent<Route> for RouteRef<'_> {
    fn equivalent(&self, key: &Route) -> bool {
        *self.method == key.method && self.path == key.path
    }
}
