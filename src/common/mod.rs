//! Common module
//!
//! This module contains shared types, errors, and utility functions used throughout the application.

pub mod error;
pub mod log;
pub mod net;
pub mod types;

// Re-export commonly used types and functions
pub use error::{RelayError, Result};
pub use log::{init_logger, set_log_level};
pub use net::parse_socket_addr;
pub use types::Side;
