//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the route table and compose the middleware chain
//! - Wire up host layers (timeout, body limit)
//! - Serve the listener until shutdown, one task per connection

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::api::registry::BorgRegistry;
use crate::config::ServerConfig;
use crate::context::RequestContext;
use crate::http::ingress::Ingress;
use crate::http::middleware::Chain;
use crate::lifecycle::shutdown;
use crate::net::listener::{self, ListenerError};
use crate::observability::{LogSink, TraceSink};
use crate::routing::{default_routes, RouteError, Router};

/// Errors from building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid route table: {0}")]
    Routes(#[from] RouteError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for the demo API.
pub struct HttpServer {
    app: axum::Router,
    context: RequestContext,
    registry: Arc<BorgRegistry>,
}

impl HttpServer {
    /// Server with the default routes, tracing requests to the log.
    pub fn new(config: &ServerConfig) -> Result<Self, ServerError> {
        Self::with_trace_sink(config, Arc::new(LogSink))
    }

    /// Server with the default routes, sending trace records to `sink`.
    pub fn with_trace_sink(
        config: &ServerConfig,
        sink: Arc<dyn TraceSink>,
    ) -> Result<Self, ServerError> {
        let registry = Arc::new(BorgRegistry::new());
        let router = Router::from_routes(Chain::standard(sink), default_routes(registry.clone()))?;
        Ok(Self::from_router(config, router, registry))
    }

    /// Server around an already populated router.
    pub fn from_router(config: &ServerConfig, router: Router, registry: Arc<BorgRegistry>) -> Self {
        let context = RequestContext::background().with_package("server");
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);
        let ingress = Ingress::new(context.clone()).with_request_timeout(request_timeout);

        let app = router
            .into_service(ingress)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                request_timeout,
            ));

        Self {
            app,
            context,
            registry,
        }
    }

    /// The composed axum router, for driving requests without a socket.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    pub fn registry(&self) -> &Arc<BorgRegistry> {
        &self.registry
    }

    /// Bind `address` and serve it until `shutdown` fires.
    pub async fn bind_and_run(
        self,
        address: &str,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let listener = listener::bind(address).await?;
        self.run(listener, shutdown).await
    }

    /// Serve `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let logger = self.context.logger();
        let addr = listener.local_addr()?;
        logger.info(format_args!("Starting server and listening on {addr}"));

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        logger.info("Server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::Request;
    use tower::ServiceExt;

    use crate::http::middleware::X_REQUEST_ID;

    #[tokio::test]
    async fn serves_the_default_routes() {
        let server = HttpServer::new(&ServerConfig::default()).unwrap();

        let response = server
            .app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let mut config = ServerConfig::default();
        config.limits.max_body_bytes = 4;
        let server = HttpServer::new(&config).unwrap();

        let response = server
            .app()
            .oneshot(
                Request::post("/echo")
                    .header("content-length", "11")
                    .body(Body::from("hello world"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn oversized_streamed_bodies_are_rejected() {
        let mut config = ServerConfig::default();
        config.limits.max_body_bytes = 4;
        let server = HttpServer::new(&config).unwrap();

        let chunks = futures_util::stream::iter([Ok::<_, std::io::Error>("hello world")]);
        let response = server
            .app()
            .oneshot(
                Request::post("/echo")
                    .body(Body::from_stream(chunks))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn run_returns_after_shutdown() {
        let server = HttpServer::new(&ServerConfig::default()).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let shutdown = crate::lifecycle::Shutdown::new();

        let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));
        shutdown.trigger();

        handle.await.unwrap().unwrap();
    }
}
