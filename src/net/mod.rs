//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! bind address (config or --listen)
//!     → listener.rs (resolve, bind)
//!     → TcpListener handed to the HTTP server
//!     → axum accepts connections, one task per connection
//! ```

pub mod listener;

pub use listener::{bind, resolve_bind_address, ListenerError};
