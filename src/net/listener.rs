//! TCP listener setup.
//!
//! # Responsibilities
//! - Resolve the configured bind address
//! - Bind the TCP listener handed to the HTTP server
//!
//! # Design Decisions
//! - `:PORT` (host omitted) binds all IPv4 interfaces
//! - Bind failures are fatal for the caller

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The address string could not be parsed.
    #[error("Invalid bind address {address:?}: {source}")]
    Address {
        address: String,
        source: std::net::AddrParseError,
    },

    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: std::io::Error,
    },
}

/// Parse a bind address, accepting `:8080` as shorthand for `0.0.0.0:8080`.
pub fn resolve_bind_address(address: &str) -> Result<SocketAddr, ListenerError> {
    let address = address.trim();
    let full = match address.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => address.to_owned(),
    };
    full.parse().map_err(|source| ListenerError::Address {
        address: address.to_owned(),
        source,
    })
}

/// Bind a TCP listener on `address`.
pub async fn bind(address: &str) -> Result<TcpListener, ListenerError> {
    let addr = resolve_bind_address(address)?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind {
            address: addr,
            source,
        })?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::info!(address = %local_addr, "Listener bound");
    }
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_only_means_all_interfaces() {
        assert_eq!(
            resolve_bind_address(":8080").unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn full_addresses_pass_through() {
        assert_eq!(
            resolve_bind_address("127.0.0.1:3000").unwrap(),
            "127.0.0.1:3000".parse::<SocketAddr>().unwrap()
        );
        assert!(resolve_bind_address("[::1]:3000").is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            resolve_bind_address("localhost"),
            Err(ListenerError::Address { .. })
        ));
        assert!(resolve_bind_address(":http").is_err());
    }

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let listener = bind("127.0.0.1:0").await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
