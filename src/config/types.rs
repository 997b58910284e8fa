//! Configuration types
//!
//! This module contains the main configuration types used throughout the application.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

use crate::common::parse_socket_addr;
use crate::config::defaults;

/// Source of a configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSource {
    /// Default value
    Default,
    /// From configuration file
    File,
    /// From environment variable
    Environment,
    /// From command line argument
    CommandLine,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Default => write!(f, "default"),
            ValueSource::File => write!(f, "file"),
            ValueSource::Environment => write!(f, "environment"),
            ValueSource::CommandLine => write!(f, "command line"),
        }
    }
}

/// Custom deserializer for socket addresses, resolving host names
fn deserialize_socket_addr<'de, D>(deserializer: D) -> std::result::Result<Option<SocketAddr>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    match s {
        Some(addr_str) => parse_socket_addr(&addr_str)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Configuration values
///
/// Every field is optional so that a source only contributes the values it
/// actually sets. Values from a higher priority source replace those of a
/// lower one in [`ConfigValues::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigValues {
    /// External listen address (host:port)
    #[serde(default, deserialize_with = "deserialize_socket_addr", skip_serializing_if = "Option::is_none")]
    pub external: Option<SocketAddr>,

    /// Internal listen address (host:port)
    #[serde(default, deserialize_with = "deserialize_socket_addr", skip_serializing_if = "Option::is_none")]
    pub internal: Option<SocketAddr>,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Maximum number of bytes read per pump iteration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,

    /// Capacity of the arrival channels and of each pump channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_capacity: Option<usize>,

    /// Heartbeat interval of the rendezvous loop in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartbeat_secs: Option<u64>,

    /// Initial capacity of each pairing queue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_capacity: Option<usize>,

    /// Optional cap on connections waiting in one pairing queue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_queue_len: Option<usize>,
}

impl ConfigValues {
    /// Overlay `other` on top of `self`
    ///
    /// Any field set in `other` wins; unset fields keep the value of `self`.
    pub fn merge(self, other: ConfigValues) -> Self {
        Self {
            external: other.external.or(self.external),
            internal: other.internal.or(self.internal),
            log_level: other.log_level.or(self.log_level),
            chunk_size: other.chunk_size.or(self.chunk_size),
            channel_capacity: other.channel_capacity.or(self.channel_capacity),
            heartbeat_secs: other.heartbeat_secs.or(self.heartbeat_secs),
            queue_capacity: other.queue_capacity.or(self.queue_capacity),
            max_queue_len: other.max_queue_len.or(self.max_queue_len),
        }
    }

    /// Names of the fields this set of values defines
    pub fn defined_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.external.is_some() { fields.push("external"); }
        if self.internal.is_some() { fields.push("internal"); }
        if self.log_level.is_some() { fields.push("log_level"); }
        if self.chunk_size.is_some() { fields.push("chunk_size"); }
        if self.channel_capacity.is_some() { fields.push("channel_capacity"); }
        if self.heartbeat_secs.is_some() { fields.push("heartbeat_secs"); }
        if self.queue_capacity.is_some() { fields.push("queue_capacity"); }
        if self.max_queue_len.is_some() { fields.push("max_queue_len"); }
        fields
    }
}

/// Relay configuration
///
/// Fully resolved configuration: every value is known, either from one of
/// the configuration sources or from [`defaults`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// External listen address
    pub external: SocketAddr,
    /// Internal listen address
    pub internal: SocketAddr,
    /// Log level
    pub log_level: String,
    /// Maximum number of bytes read per pump iteration
    pub chunk_size: usize,
    /// Capacity of the arrival channels and of each pump channel
    pub channel_capacity: usize,
    /// Heartbeat interval of the rendezvous loop in seconds
    pub heartbeat_secs: u64,
    /// Initial capacity of each pairing queue
    pub queue_capacity: usize,
    /// Optional cap on connections waiting in one pairing queue
    pub max_queue_len: Option<usize>,
    /// Configuration file the values were read from, if any
    pub config_file: Option<PathBuf>,
    /// Where each explicitly configured value came from
    pub sources: HashMap<String, ValueSource>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::from_values(ConfigValues::default())
    }
}

impl RelayConfig {
    /// Resolve a set of values, filling unset fields with defaults
    pub fn from_values(values: ConfigValues) -> Self {
        Self {
            external: values.external.unwrap_or_else(defaults::external),
            internal: values.internal.unwrap_or_else(defaults::internal),
            log_level: values.log_level.unwrap_or_else(defaults::log_level),
            chunk_size: values.chunk_size.unwrap_or_else(defaults::chunk_size),
            channel_capacity: values.channel_capacity.unwrap_or_else(defaults::channel_capacity),
            heartbeat_secs: values.heartbeat_secs.unwrap_or_else(defaults::heartbeat_secs),
            queue_capacity: values.queue_capacity.unwrap_or_else(defaults::queue_capacity),
            max_queue_len: values.max_queue_len.or_else(defaults::max_queue_len),
            config_file: None,
            sources: HashMap::new(),
        }
    }

    /// Heartbeat interval as a `Duration`
    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }

    /// Where a value came from
    pub fn source_of(&self, field: &str) -> ValueSource {
        self.sources.get(field).copied().unwrap_or(ValueSource::Default)
    }

    /// Log the configuration at debug level
    pub fn log(&self) {
        debug!("  external: {} ({})", self.external, self.source_of("external"));
        debug!("  internal: {} ({})", self.internal, self.source_of("internal"));
        debug!("  log_level: {} ({})", self.log_level, self.source_of("log_level"));
        debug!("  chunk_size: {} ({})", self.chunk_size, self.source_of("chunk_size"));
        debug!("  channel_capacity: {} ({})", self.channel_capacity, self.source_of("channel_capacity"));
        debug!("  heartbeat_secs: {} ({})", self.heartbeat_secs, self.source_of("heartbeat_secs"));
        debug!("  queue_capacity: {} ({})", self.queue_capacity, self.source_of("queue_capacity"));
        match self.max_queue_len {
            Some(cap) => debug!("  max_queue_len: {} ({})", cap, self.source_of("max_queue_len")),
            None => debug!("  max_queue_len: unbounded"),
        }
    }
}
