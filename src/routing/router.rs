//! Route registration and handler composition.
//!
//! # Responsibilities
//! - Store registered routes (the route table)
//! - Compose the middleware chain onto each handler exactly once
//! - Install composed handlers into an axum router
//!
//! # Design Decisions
//! - Immutable after `into_service` (thread-safe without locks)
//! - Dispatch is an exact `(method, path)` match done by axum
//! - Duplicate bindings are rejected at registration, not at dispatch
//! - Registration order does not affect dispatch

use std::collections::BTreeMap;

use axum::extract::Request;
use axum::http::Method;
use axum::routing::{MethodFilter, MethodRouter};
use thiserror::Error;

use crate::http::handler::BoxHandler;
use crate::http::ingress::Ingress;
use crate::http::middleware::Chain;
use crate::routing::route::Route;

/// Errors raised while building the route table.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Another route already binds the same method and path.
    #[error("route {name}: {method} {pattern} is already registered by {existing}")]
    Duplicate {
        name: String,
        existing: String,
        method: Method,
        pattern: String,
    },

    /// The method has no axum method filter.
    #[error("route {name}: method {method} cannot be routed")]
    UnsupportedMethod { name: String, method: Method },

    /// Path patterns must be absolute.
    #[error("route {name}: path {pattern:?} must start with '/'")]
    InvalidPattern { name: String, pattern: String },
}

/// The route table plus the chain applied to every route.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    chain: Chain,
}

impl Router {
    pub fn new(chain: Chain) -> Self {
        Self {
            routes: Vec::new(),
            chain,
        }
    }

    /// Build a router from a full route table.
    pub fn from_routes(
        chain: Chain,
        routes: impl IntoIterator<Item = Route>,
    ) -> Result<Self, RouteError> {
        let mut router = Self::new(chain);
        for route in routes {
            router.register(route)?;
        }
        Ok(router)
    }

    /// Add one binding.
    pub fn register(&mut self, route: Route) -> Result<(), RouteError> {
        if !route.pattern().starts_with('/') {
            return Err(RouteError::InvalidPattern {
                name: route.name().to_owned(),
                pattern: route.pattern().to_owned(),
            });
        }
        if MethodFilter::try_from(route.method().clone()).is_err() {
            return Err(RouteError::UnsupportedMethod {
                name: route.name().to_owned(),
                method: route.method().clone(),
            });
        }
        if let Some(existing) = self
            .routes
            .iter()
            .find(|r| r.method() == route.method() && r.pattern() == route.pattern())
        {
            return Err(RouteError::Duplicate {
                name: route.name().to_owned(),
                existing: existing.name().to_owned(),
                method: route.method().clone(),
                pattern: route.pattern().to_owned(),
            });
        }

        self.routes.push(route);
        Ok(())
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The handler actually installed for `route`: the chain around its
    /// raw handler.
    pub fn build_handler(&self, route: &Route) -> BoxHandler {
        self.chain.apply(route, route.handler().clone())
    }

    /// Compose every route and install it into an axum router.
    pub fn into_service(self, ingress: Ingress) -> axum::Router {
        let logger = ingress.base().logger();
        let mut by_path: BTreeMap<String, MethodRouter> = BTreeMap::new();

        for route in &self.routes {
            // Validated in `register`.
            let Ok(filter) = MethodFilter::try_from(route.method().clone()) else {
                continue;
            };
            let handler = self.build_handler(route);
            let ingress = ingress.clone();
            let endpoint = move |req: Request| {
                let handler = handler.clone();
                let ingress = ingress.clone();
                async move { ingress.dispatch(&handler, req).await }
            };

            let methods = by_path
                .remove(route.pattern())
                .unwrap_or_else(MethodRouter::new);
            by_path.insert(route.pattern().to_owned(), methods.on(filter, endpoint));

            tracing::info!(
                parent: logger.span(),
                name = %route.name(),
                method = %route.method(),
                pattern = %route.pattern(),
                "Route added {}\t{}\t{}",
                route.name(),
                route.method(),
                route.pattern()
            );
        }

        by_path
            .into_iter()
            .fold(axum::Router::new(), |app, (path, methods)| {
                app.route(&path, methods)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::http::response::ResponseWriter;
    use axum::body::Body;
    use axum::http::StatusCode;
    use futures_util::future::BoxFuture;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn hello(
        _ctx: RequestContext,
        _req: Request,
        w: &mut dyn ResponseWriter,
    ) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let _ = w.write_all(b"hello");
        })
    }

    fn created(
        _ctx: RequestContext,
        _req: Request,
        w: &mut dyn ResponseWriter,
    ) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            w.write_status(StatusCode::CREATED);
        })
    }

    #[test]
    fn rejects_duplicate_method_and_path() {
        let mut router = Router::new(Chain::new());
        router
            .register(Route::new("First", Method::GET, "/a", hello))
            .unwrap();
        router
            .register(Route::new("Other", Method::POST, "/a", hello))
            .unwrap();

        let err = router
            .register(Route::new("Second", Method::GET, "/a", hello))
            .unwrap_err();
        assert!(matches!(err, RouteError::Duplicate { ref existing, .. } if existing == "First"));
        assert_eq!(router.routes().len(), 2);
    }

    #[test]
    fn rejects_relative_pattern() {
        let mut router = Router::new(Chain::new());
        let err = router
            .register(Route::new("Bad", Method::GET, "a", hello))
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
    }

    #[test]
    fn rejects_unroutable_method() {
        let mut router = Router::new(Chain::new());
        let method = Method::from_bytes(b"BREW").unwrap();
        let err = router
            .register(Route::new("Coffee", method, "/pot", hello))
            .unwrap_err();
        assert!(matches!(err, RouteError::UnsupportedMethod { .. }));
    }

    #[test]
    fn build_handler_applies_chain_once_per_call() {
        let wraps = Arc::new(AtomicUsize::new(0));
        let counter = wraps.clone();
        let chain = Chain::new().with(move |_: &Route, next: BoxHandler| -> BoxHandler {
            counter.fetch_add(1, Ordering::SeqCst);
            next
        });
        let router =
            Router::from_routes(chain, [Route::new("Hello", Method::GET, "/", hello)]).unwrap();

        let _ = router.into_service(Ingress::default());
        assert_eq!(wraps.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dispatches_by_method_and_path() {
        let router = Router::from_routes(
            Chain::new(),
            [
                Route::new("GetThing", Method::GET, "/thing", hello),
                Route::new("PostThing", Method::POST, "/thing", created),
            ],
        )
        .unwrap();
        let app = router.into_service(Ingress::default());

        let get = app
            .clone()
            .oneshot(Request::builder().uri("/thing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(get.status(), StatusCode::OK);
        let body = axum::body::to_bytes(get.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"hello");

        let post = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/thing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(post.status(), StatusCode::CREATED);

        let missing = app
            .clone()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let wrong_method = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/thing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(wrong_method.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
