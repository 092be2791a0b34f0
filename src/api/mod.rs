//! Demo API served behind the middleware chain.
//!
//! # Endpoints
//! ```text
//! GET  /         → 200 {"message":"Welcome!"}
//! GET  /headers  → 200 text, received headers
//! POST /echo     → 200 text, the raw request
//! GET  /borgs    → 200 JSON array of registered borgs
//! POST /ping     → 201 {"borgid":..,"message":"pong"} | 400 {"error":..}
//! ```
//!
//! # Design Decisions
//! - Handlers see only the context, the request and the response sink
//! - Input errors are answered locally as 400 with a JSON error body
//! - The registry is passed in by handle, never reached through a global

pub mod handlers;
pub mod json;
pub mod registry;

pub use registry::{Borg, BorgRegistry};
