//! The server's route table.

use std::sync::Arc;

use axum::http::Method;

use crate::api::handlers::{get_headers, get_index, post_echo, GetBorgs, PostPing};
use crate::api::registry::BorgRegistry;
use crate::routing::route::Route;

/// Every endpoint the server exposes.
pub fn default_routes(registry: Arc<BorgRegistry>) -> Vec<Route> {
    vec![
        Route::new("GetIndex", Method::GET, "/", get_index),
        Route::new("GetHeaders", Method::GET, "/headers", get_headers),
        Route::new("PostEcho", Method::POST, "/echo", post_echo),
        Route::new(
            "GetBorgs",
            Method::GET,
            "/borgs",
            GetBorgs::new(registry.clone()),
        ),
        Route::new("PostPing", Method::POST, "/ping", PostPing::new(registry)),
    ]
}
