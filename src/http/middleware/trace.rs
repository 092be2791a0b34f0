//! Request tracing stage.
//!
//! Starts a timer, wraps the response sink in a [`ResponseObserver`], runs
//! the inner chain and emits one [`TraceRecord`] when it returns.
//!
//! If the inner chain panics or its future is dropped (host timeout,
//! client disconnect), the record is still emitted from a drop guard,
//! marked [`Outcome::Aborted`]. The panic itself keeps propagating.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use futures_util::future::BoxFuture;

use crate::context::{RequestContext, RequestId};
use crate::http::handler::{BoxHandler, Handler};
use crate::http::middleware::Middleware;
use crate::http::response::{ResponseObserver, ResponseWriter};
use crate::observability::{metrics, Logger, Outcome, TraceRecord, TraceSink};
use crate::routing::Route;

/// Middleware emitting a trace record per request.
#[derive(Clone)]
pub struct TraceRequests {
    sink: Arc<dyn TraceSink>,
}

impl TraceRequests {
    pub fn new(sink: Arc<dyn TraceSink>) -> Self {
        Self { sink }
    }
}

impl Middleware for TraceRequests {
    fn wrap(&self, route: &Route, next: BoxHandler) -> BoxHandler {
        Arc::new(Traced {
            route_name: route.name().to_owned(),
            sink: self.sink.clone(),
            next,
        })
    }
}

struct Traced {
    route_name: String,
    sink: Arc<dyn TraceSink>,
    next: BoxHandler,
}

impl Handler for Traced {
    fn call<'a>(
        &'a self,
        ctx: RequestContext,
        req: Request,
        w: &'a mut dyn ResponseWriter,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let mut pending = PendingTrace {
                route_name: &self.route_name,
                sink: self.sink.as_ref(),
                logger: ctx.logger(),
                request_id: ctx.request_id().cloned(),
                method: req.method().clone(),
                uri: req.uri().to_string(),
                start: Instant::now(),
                observer: ResponseObserver::new(w),
                emitted: false,
            };

            self.next.call(ctx, req, &mut pending.observer).await;
            pending.emit(Outcome::Completed);
        })
    }
}

/// Trace state for one in-flight request.
struct PendingTrace<'a> {
    route_name: &'a str,
    sink: &'a dyn TraceSink,
    logger: Logger,
    request_id: Option<RequestId>,
    method: Method,
    uri: String,
    start: Instant,
    observer: ResponseObserver<'a>,
    emitted: bool,
}

impl PendingTrace<'_> {
    fn emit(&mut self, outcome: Outcome) {
        if self.emitted {
            return;
        }
        self.emitted = true;

        let observed = self.observer.record();
        let record = TraceRecord {
            route_name: self.route_name.to_owned(),
            request_id: self.request_id.clone(),
            method: self.method.clone(),
            uri: std::mem::take(&mut self.uri),
            // Nothing written means the client gets an empty 200.
            status: observed.status().unwrap_or(StatusCode::OK),
            bytes_written: observed.bytes_written(),
            elapsed: self.start.elapsed(),
            outcome,
        };

        metrics::record_request(&record);
        self.sink.emit(&self.logger, &record);
    }
}

impl Drop for PendingTrace<'_> {
    fn drop(&mut self) {
        self.emit(Outcome::Aborted);
    }
}
