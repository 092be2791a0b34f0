//! Host side of the handler chain.
//!
//! Bridges axum and the chain: builds the per-request root context from
//! the server context, gives the chain a fresh [`BufferedResponse`] and
//! converts it into the axum response once the chain returns.

use std::time::Duration;

use axum::extract::Request;
use axum::response::Response;
use tokio::time::Instant;

use crate::context::RequestContext;
use crate::http::handler::BoxHandler;
use crate::http::response::BufferedResponse;

/// Per-request entry point shared by every route.
#[derive(Debug, Clone, Default)]
pub struct Ingress {
    base: RequestContext,
    request_timeout: Option<Duration>,
}

impl Ingress {
    pub fn new(base: RequestContext) -> Self {
        Self {
            base,
            request_timeout: None,
        }
    }

    /// Attach a deadline of `now + timeout` to every request context.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn base(&self) -> &RequestContext {
        &self.base
    }

    /// Root context for one request.
    pub fn context(&self) -> RequestContext {
        match self.request_timeout {
            Some(timeout) => self.base.with_deadline(Instant::now() + timeout),
            None => self.base.clone(),
        }
    }

    /// Run `handler` for one request.
    pub async fn dispatch(&self, handler: &BoxHandler, req: Request) -> Response {
        let mut sink = BufferedResponse::new();
        handler.call(self.context(), req, &mut sink).await;
        sink.into_response()
    }
}
