//! Route definitions.

use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::http::handler::{BoxHandler, Handler};

/// A named `(method, path)` binding to a terminal handler.
///
/// Immutable once built; the router composes middleware around the
/// handler without changing the route itself.
#[derive(Clone)]
pub struct Route {
    name: String,
    method: Method,
    pattern: String,
    handler: BoxHandler,
}

impl Route {
    pub fn new(
        name: impl Into<String>,
        method: Method,
        pattern: impl Into<String>,
        handler: impl Handler,
    ) -> Self {
        Self::from_boxed(name, method, pattern, Arc::new(handler))
    }

    pub fn from_boxed(
        name: impl Into<String>,
        method: Method,
        pattern: impl Into<String>,
        handler: BoxHandler,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            pattern: pattern.into(),
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The raw handler, before any middleware.
    pub fn handler(&self) -> &BoxHandler {
        &self.handler
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}
