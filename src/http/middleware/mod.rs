//! Middleware chain.
//!
//! # Data Flow
//! ```text
//! Chain [AssignRequestId, TraceRequests]
//!     → applied once per route at registration
//!     → AssignRequestId(TraceRequests(business handler))
//!
//! Request:  AssignRequestId → TraceRequests → handler
//! Return:   handler → TraceRequests (emit trace) → AssignRequestId
//! ```
//!
//! # Design Decisions
//! - The first middleware in the list is the outermost layer
//! - A request ID exists before any trace or business code runs
//! - Timing and response observation wrap the entire inner chain
//! - Panics are not caught here; they propagate to the host

pub mod request_id;
pub mod trace;

use std::sync::Arc;

use crate::http::handler::BoxHandler;
use crate::observability::TraceSink;
use crate::routing::Route;

pub use request_id::{AssignRequestId, X_REQUEST_ID};
pub use trace::TraceRequests;

/// Transform producing a new handler around `next`.
pub trait Middleware: Send + Sync {
    fn wrap(&self, route: &Route, next: BoxHandler) -> BoxHandler;
}

impl<F> Middleware for F
where
    F: Fn(&Route, BoxHandler) -> BoxHandler + Send + Sync,
{
    fn wrap(&self, route: &Route, next: BoxHandler) -> BoxHandler {
        self(route, next)
    }
}

/// Ordered list of middleware, outermost first.
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    /// An empty chain; applying it returns the handler unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request ID assignment around request tracing.
    pub fn standard(sink: Arc<dyn TraceSink>) -> Self {
        Self::new()
            .with(AssignRequestId)
            .with(TraceRequests::new(sink))
    }

    /// Append a layer inside the ones already present.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Wrap `handler` in every layer.
    pub fn apply(&self, route: &Route, handler: BoxHandler) -> BoxHandler {
        self.layers
            .iter()
            .rev()
            .fold(handler, |next, layer| layer.wrap(route, next))
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("layers", &self.layers.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::http::handler::Handler;
    use crate::http::response::{BufferedResponse, ResponseWriter};
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::Method;
    use futures_util::future::BoxFuture;
    use std::sync::Mutex;

    type Journal = Arc<Mutex<Vec<String>>>;

    struct Tagged {
        tag: &'static str,
        journal: Journal,
        next: BoxHandler,
    }

    impl Handler for Tagged {
        fn call<'a>(
            &'a self,
            ctx: RequestContext,
            req: Request,
            w: &'a mut dyn ResponseWriter,
        ) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                self.journal.lock().unwrap().push(format!("{} in", self.tag));
                self.next.call(ctx, req, w).await;
                self.journal.lock().unwrap().push(format!("{} out", self.tag));
            })
        }
    }

    fn tag(tag: &'static str, journal: &Journal) -> impl Middleware + 'static {
        let journal = journal.clone();
        move |_: &Route, next: BoxHandler| -> BoxHandler {
            Arc::new(Tagged {
                tag,
                journal: journal.clone(),
                next,
            })
        }
    }

    fn terminal(journal: &Journal) -> Route {
        let journal = journal.clone();
        Route::new(
            "Terminal",
            Method::GET,
            "/",
            Tagged {
                tag: "handler",
                journal,
                next: Arc::new(noop),
            },
        )
    }

    fn noop(
        _ctx: RequestContext,
        _req: Request,
        _w: &mut dyn ResponseWriter,
    ) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }

    #[tokio::test]
    async fn first_layer_runs_outermost() {
        let journal: Journal = Arc::default();
        let chain = Chain::new()
            .with(tag("outer", &journal))
            .with(tag("inner", &journal));
        let route = terminal(&journal);

        let handler = chain.apply(&route, route.handler().clone());
        let mut sink = BufferedResponse::new();
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        handler.call(RequestContext::background(), req, &mut sink).await;

        let journal = journal.lock().unwrap();
        assert_eq!(
            *journal,
            vec![
                "outer in",
                "inner in",
                "handler in",
                "handler out",
                "inner out",
                "outer out"
            ]
        );
    }

    #[test]
    fn empty_chain_returns_handler_unchanged() {
        let journal: Journal = Arc::default();
        let route = terminal(&journal);
        let chain = Chain::new();
        assert!(chain.is_empty());

        let handler = chain.apply(&route, route.handler().clone());
        assert!(Arc::ptr_eq(&handler, route.handler()));
    }
}
