//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via the context Logger)
//!     → trace.rs (one TraceRecord per request)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through all log events as a span field
//! - The logging sink is process-wide; each event is written atomically
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod trace;

pub use logging::{init_logging, Logger};
pub use trace::{LogSink, Outcome, TraceRecord, TraceSink};
