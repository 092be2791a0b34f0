//! Minimal HTTP server with per-request context propagation.

pub mod api;
pub mod client;
pub mod config;
pub mod context;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use client::ReqtraceClient;
pub use config::schema::ServerConfig;
pub use context::{RequestContext, RequestId};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
