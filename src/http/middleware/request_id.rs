//! Request ID assignment.
//!
//! Outermost stage of the chain. Generates the request ID, derives the
//! request context from the ingress context, and runs the inner chain
//! inside the request logger's span so plain `tracing` events emitted by
//! handlers carry the ID too.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use futures_util::future::BoxFuture;
use tracing::Instrument;

use crate::context::{RequestContext, RequestId};
use crate::http::handler::{BoxHandler, Handler};
use crate::http::middleware::Middleware;
use crate::http::response::ResponseWriter;
use crate::routing::Route;

/// Response header echoing the assigned request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Middleware assigning a fresh [`RequestId`] to every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignRequestId;

impl Middleware for AssignRequestId {
    fn wrap(&self, _route: &Route, next: BoxHandler) -> BoxHandler {
        Arc::new(WithRequestId { next })
    }
}

struct WithRequestId {
    next: BoxHandler,
}

impl Handler for WithRequestId {
    fn call<'a>(
        &'a self,
        ctx: RequestContext,
        req: Request,
        w: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, ()> {
        let id = RequestId::new();
        if let Ok(value) = HeaderValue::from_str(id.as_str()) {
            w.headers_mut()
                .insert(HeaderName::from_static(X_REQUEST_ID), value);
        }

        let ctx = ctx.with_request_id(id);
        let span = ctx.logger().span().clone();
        Box::pin(self.next.call(ctx, req, w).instrument(span))
    }
}
