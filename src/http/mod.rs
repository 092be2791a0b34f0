//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum serve, host layers: timeout, body limit)
//!     → routing (method + path → composed handler)
//!     → ingress.rs (root context, buffered response sink)
//!     → middleware (request ID → trace → handler)
//!     → response.rs (sink → axum Response)
//!     → Send to client
//! ```

pub mod handler;
pub mod ingress;
pub mod middleware;
pub mod response;
pub mod server;

pub use handler::{BoxHandler, Handler};
pub use ingress::Ingress;
pub use middleware::{AssignRequestId, Chain, Middleware, TraceRequests, X_REQUEST_ID};
pub use response::{BufferedResponse, ResponseObserver, ResponseRecord, ResponseWriter};
pub use server::HttpServer;
