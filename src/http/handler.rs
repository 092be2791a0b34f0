//! Request handlers.
//!
//! A handler receives the request's context, the request itself and the
//! response sink. Middleware stages and business handlers share this one
//! shape, so stages compose by wrapping.

use std::sync::Arc;

use axum::extract::Request;
use futures_util::future::BoxFuture;

use crate::context::RequestContext;
use crate::http::response::ResponseWriter;

/// A stage or terminal handler in the request chain.
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(
        &'a self,
        ctx: RequestContext,
        req: Request,
        w: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, ()>;
}

/// Shared, type-erased handler as installed in the route table.
pub type BoxHandler = Arc<dyn Handler>;

impl<F> Handler for F
where
    F: for<'a> Fn(RequestContext, Request, &'a mut dyn ResponseWriter) -> BoxFuture<'a, ()>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(
        &'a self,
        ctx: RequestContext,
        req: Request,
        w: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, ()> {
        self(ctx, req, w)
    }
}
