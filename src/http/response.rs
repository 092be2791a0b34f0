//! Response sinks.
//!
//! # Responsibilities
//! - Define the [`ResponseWriter`] sink handlers write into
//! - Buffer a response and convert it for axum ([`BufferedResponse`])
//! - Observe status and size without changing behavior ([`ResponseObserver`])
//!
//! # Design Decisions
//! - Body bytes go through `std::io::Write`, so `write!` and
//!   `serde_json::to_writer` work on any sink
//! - The first status wins; a body write before any status implies 200
//! - The observer counts what the sink reports, not what was offered

use std::io;

use axum::{
    body::Body,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

/// Outbound response sink for one request.
pub trait ResponseWriter: io::Write + Send {
    /// Headers to send with the response.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Set the response status.
    fn write_status(&mut self, status: StatusCode);
}

/// In-memory response sink converted into an axum [`Response`] once the
/// handler chain returns.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Build the response. A handler that wrote nothing yields an empty 200.
    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        BufferedResponse::into_response(self)
    }
}

impl io::Write for BufferedResponse {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            Some(current) => tracing::warn!(
                current = current.as_u16(),
                ignored = status.as_u16(),
                "Superfluous status write"
            ),
            None => self.status = Some(status),
        }
    }
}

/// Status and size observed on one response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseRecord {
    status: Option<StatusCode>,
    bytes_written: u64,
}

impl ResponseRecord {
    /// First status written, `None` if the handler wrote nothing yet.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Total body bytes accepted by the underlying sink.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

/// One-shot wrapper recording the status and byte count written through it.
pub struct ResponseObserver<'w> {
    inner: &'w mut dyn ResponseWriter,
    record: ResponseRecord,
}

impl<'w> ResponseObserver<'w> {
    pub fn new(inner: &'w mut dyn ResponseWriter) -> Self {
        Self {
            inner,
            record: ResponseRecord::default(),
        }
    }

    pub fn record(&self) -> ResponseRecord {
        self.record
    }
}

impl io::Write for ResponseObserver<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.record.status.is_none() {
            self.record.status = Some(StatusCode::OK);
        }
        let written = self.inner.write(buf)?;
        self.record.bytes_written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl ResponseWriter for ResponseObserver<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.record.status.is_none() {
            self.record.status = Some(status);
        }
        self.inner.write_status(status);
    }
}
