//! Rendezvous Relay: pair TCP connections from two listeners and relay between them
//!
//! The relay accepts connections on an external and an internal listener,
//! pairs the i-th external arrival with the i-th internal arrival, and then
//! forwards bytes in both directions between the two members of each pair
//! until either side disconnects. Traffic is passed through untouched.
//!
//! # Main Features
//!
//! - Strict FIFO pairing per side, with growable ring-buffer queues
//! - One relay worker per pair, failures contained to that pair
//! - Layered configuration: defaults, JSON file, environment, command line
//! - An echo peer for exercising a running relay
//!
//! # Example
//!
//! ```no_run
//! use rendezvous_relay::{Relay, Result};
//! use rendezvous_relay::config::ConfigBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConfigBuilder::default().build()?;
//!
//!     let relay = Relay::bind(config)?;
//!     relay.run().await
//! }
//! ```

// Public modules
pub mod common;
pub mod config;
pub mod echo;
pub mod relay;

// Re-export commonly used structures and functions for convenience
pub use common::{parse_socket_addr, RelayError, Result, Side};
pub use config::RelayConfig;
pub use relay::Relay;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
