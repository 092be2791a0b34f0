//! Per-request trace records.
//!
//! One [`TraceRecord`] is produced for each request by the trace stage
//! and handed to a [`TraceSink`]. Records are never stored by the server.

use std::fmt;
use std::time::Duration;

use axum::http::{Method, StatusCode};

use crate::context::RequestId;
use crate::observability::logging::Logger;

/// How the traced handler chain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The chain returned normally.
    Completed,
    /// The chain panicked or its future was dropped before returning.
    Aborted,
}

/// Summary of one request, emitted after the handler chain ends.
#[derive(Debug, Clone)]
pub struct TraceRecord {
    pub route_name: String,
    pub request_id: Option<RequestId>,
    pub method: Method,
    pub uri: String,
    pub status: StatusCode,
    pub bytes_written: u64,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP Request {}\t{}\t{}\t{}\t{}\t{:?}",
            self.route_name,
            self.method,
            self.uri,
            self.status.as_u16(),
            self.bytes_written,
            self.elapsed
        )?;
        if self.outcome == Outcome::Aborted {
            f.write_str("\taborted")?;
        }
        Ok(())
    }
}

/// Destination for trace records.
///
/// Implementations are shared by every request and must tolerate
/// concurrent calls.
pub trait TraceSink: Send + Sync {
    fn emit(&self, logger: &Logger, record: &TraceRecord);
}

/// Writes trace records through the request's logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn emit(&self, logger: &Logger, record: &TraceRecord) {
        let status = record.status.as_u16();
        let elapsed_us = record.elapsed.as_micros() as u64;
        match record.outcome {
            Outcome::Completed => tracing::info!(
                parent: logger.span(),
                route = %record.route_name,
                status,
                bytes = record.bytes_written,
                elapsed_us,
                "{}",
                record
            ),
            Outcome::Aborted => tracing::warn!(
                parent: logger.span(),
                route = %record.route_name,
                status,
                bytes = record.bytes_written,
                elapsed_us,
                "{}",
                record
            ),
        }
    }
}
