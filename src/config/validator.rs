//! Configuration validator
//!
//! This module provides functionality for validating configuration.

use log::warn;

use crate::common::log::is_valid_level;
use crate::config::error::{ConfigError, Result};
use crate::config::types::RelayConfig;

/// Validate the configuration
pub fn validate_config(config: &RelayConfig) -> Result<()> {
    validate_network_settings(config)?;
    validate_relay_settings(config)?;

    for warning in config.check_warnings() {
        warn!("{}", warning);
    }

    Ok(())
}

/// Validate network settings
fn validate_network_settings(config: &RelayConfig) -> Result<()> {
    // Port 0 asks for an ephemeral port, so each side still gets its own
    if config.external == config.internal && config.external.port() != 0 {
        return Err(ConfigError::InvalidCombination(
            "External and internal addresses must be different".to_string()
        ));
    }

    Ok(())
}

fn positive(name: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(ConfigError::InvalidValue(
            name.to_string(),
            "must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Validate pairing and forwarding settings
fn validate_relay_settings(config: &RelayConfig) -> Result<()> {
    positive("chunk_size", config.chunk_size as u64)?;
    // tokio channels cannot be created with a capacity of zero
    positive("channel_capacity", config.channel_capacity as u64)?;
    positive("heartbeat_secs", config.heartbeat_secs)?;
    positive("queue_capacity", config.queue_capacity as u64)?;

    if let Some(cap) = config.max_queue_len {
        positive("max_queue_len", cap as u64)?;
    }

    Ok(())
}

/// Configuration validator trait
pub trait ConfigValidator {
    /// Check configuration for warnings
    fn check_warnings(&self) -> Vec<String>;
}

impl ConfigValidator for RelayConfig {
    fn check_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !is_valid_level(&self.log_level) {
            warnings.push(format!("Invalid log level '{}', using default 'info'", self.log_level));
        }

        if let Some(cap) = self.max_queue_len {
            warnings.push(format!(
                "Pairing queues are capped at {} connections, excess arrivals will be dropped",
                cap
            ));
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
        assert!(RelayConfig::default().check_warnings().is_empty());
    }

    #[test]
    fn test_same_addresses_rejected() {
        let mut config = RelayConfig::default();
        config.internal = config.external;

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidCombination(_))
        ));
    }

    #[test]
    fn test_ephemeral_ports_may_share_an_address() {
        let mut config = RelayConfig::default();
        config.external = "127.0.0.1:0".parse().unwrap();
        config.internal = "127.0.0.1:0".parse().unwrap();

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = RelayConfig::default();
        config.chunk_size = 0;
        assert!(validate_config(&config).is_err());

        let mut config = RelayConfig::default();
        config.channel_capacity = 0;
        assert!(validate_config(&config).is_err());

        let mut config = RelayConfig::default();
        config.max_queue_len = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_warnings() {
        let mut config = RelayConfig::default();
        config.log_level = "loud".to_string();
        config.max_queue_len = Some(5);

        let warnings = config.check_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(validate_config(&config).is_ok(), "Warnings should not fail validation");
    }
}
