//! Default configuration values
//!
//! Single source of truth for defaults.

use std::net::SocketAddr;
use std::str::FromStr;

/// Environment variable prefix for all configuration options
pub const ENV_PREFIX: &str = "RENDEZVOUS_RELAY_";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Default external listen address as string
pub const EXTERNAL_STR: &str = "127.0.0.1:9999";

/// Default internal listen address as string
pub const INTERNAL_STR: &str = "127.0.0.1:9998";

/// Default log level as string
pub const LOG_LEVEL_STR: &str = "info";

/// Default external listen address
pub fn external() -> SocketAddr {
    SocketAddr::from_str(EXTERNAL_STR)
        .expect("Default external address should be valid")
}

/// Default internal listen address
pub fn internal() -> SocketAddr {
    SocketAddr::from_str(INTERNAL_STR)
        .expect("Default internal address should be valid")
}

/// Default log level
pub fn log_level() -> String {
    LOG_LEVEL_STR.to_string()
}

/// Default read chunk size (1KB)
pub fn chunk_size() -> usize {
    1024
}

/// Default capacity of arrival and pump channels
pub fn channel_capacity() -> usize {
    100
}

/// Default heartbeat interval of the rendezvous loop in seconds
pub fn heartbeat_secs() -> u64 {
    10
}

/// Default initial capacity of each pairing queue
pub fn queue_capacity() -> usize {
    3
}

/// Pairing queues are unbounded unless a cap is configured
pub fn max_queue_len() -> Option<usize> {
    None
}

/// Listen backlog passed to `listen(2)`
pub fn listen_backlog() -> i32 {
    1024
}
