//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from config
//! - Provide the request-scoped [`Logger`] handle
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` overrides the configured level
//! - A logger is a span; scoping a logger nests a child span under it

use std::fmt::Display;

use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::context::RequestId;

/// Handle used for every log emission during a request.
///
/// The default logger has no span and emits root events, so it is always
/// safe to use.
#[derive(Debug, Clone)]
pub struct Logger {
    span: Span,
}

impl Logger {
    pub(crate) fn for_package(&self, name: &str) -> Self {
        Self {
            span: tracing::info_span!(parent: &self.span, "package", name = %name),
        }
    }

    pub(crate) fn for_request(&self, id: &RequestId) -> Self {
        Self {
            span: tracing::info_span!(parent: &self.span, "request", request_id = %id),
        }
    }

    /// The span events from this logger are attached to.
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn debug(&self, message: impl Display) {
        tracing::debug!(parent: &self.span, "{}", message);
    }

    pub fn info(&self, message: impl Display) {
        tracing::info!(parent: &self.span, "{}", message);
    }

    pub fn warn(&self, message: impl Display) {
        tracing::warn!(parent: &self.span, "{}", message);
    }

    pub fn error(&self, message: impl Display) {
        tracing::error!(parent: &self.span, "{}", message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self { span: Span::none() }
    }
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(
    config: &ObservabilityConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
}
