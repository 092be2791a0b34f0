//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Table (at startup):
//!     table.rs (static name/method/path/handler list)
//!     → router.rs register (reject duplicates)
//!     → build_handler: Chain applied once per route
//!     → into_service: grouped by path into an axum Router
//!
//! Incoming Request (method, path)
//!     → axum exact match
//!     → Ingress::dispatch → composed handler
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact path matching, no prefixes
//! - Unmatched path is 404, unmatched method is 405

pub mod route;
pub mod router;
pub mod table;

pub use route::Route;
pub use router::{RouteError, Router};
pub use table::default_routes;
