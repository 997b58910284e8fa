//! Error handling module
//!
//! This module defines the error types and result type aliases used in the application.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

use super::types::Side;

/// Rendezvous relay error type
#[derive(Error, Debug)]
pub enum RelayError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A listening socket could not be bound
    #[error("Cannot listen on {addr}: {source}")]
    Bind {
        /// Address we tried to bind
        addr: SocketAddr,
        /// Underlying socket error
        #[source]
        source: io::Error,
    },

    /// A listener failed to accept a connection
    #[error("Could not accept connection on {side} listener: {source}")]
    Accept {
        /// Listener side that failed
        side: Side,
        /// Underlying socket error
        #[source]
        source: io::Error,
    },

    /// An outbound connection could not be established
    #[error("Could not make connection to {addr}: {source}")]
    Connect {
        /// Remote address
        addr: SocketAddr,
        /// Underlying socket error
        #[source]
        source: io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other error
    #[error("Other error: {0}")]
    Other(String),
}

impl RelayError {
    /// Process exit code for a fatal error
    ///
    /// Bind failures exit with 1 and accept failures with 2. Every other
    /// startup failure is reported with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Accept { .. } => 2,
            _ => 1,
        }
    }
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `RelayError`.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let relay_err: RelayError = io_err.into();

        match relay_err {
            RelayError::Io(_) => {}
            _ => panic!("Should convert to IO error"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = RelayError::Config("Invalid configuration".to_string());
        assert!(err.to_string().contains("Invalid configuration"));

        let err = RelayError::Accept {
            side: Side::Internal,
            source: io::Error::new(io::ErrorKind::Other, "boom"),
        };
        assert_eq!(err.to_string(), "Could not accept connection on internal listener: boom");
    }

    #[test]
    fn test_exit_codes() {
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let bind = RelayError::Bind {
            addr,
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        let accept = RelayError::Accept {
            side: Side::External,
            source: io::Error::new(io::ErrorKind::Other, "accept"),
        };

        assert_eq!(bind.exit_code(), 1);
        assert_eq!(accept.exit_code(), 2);
        assert_eq!(RelayError::Config("bad".to_string()).exit_code(), 1);
    }
}
