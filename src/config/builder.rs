//! Configuration builder
//!
//! This module provides a builder pattern for constructing configuration.

use std::path::Path;

use log::debug;

use crate::config::defaults::{DEFAULT_CONFIG_FILE, ENV_PREFIX};
use crate::config::error::Result;
use crate::config::source::{ConfigSource, DefaultSource, EnvSource, FileSource, ValuesSource};
use crate::config::types::{ConfigValues, RelayConfig};
use crate::config::validator::validate_config;

/// Configuration builder
///
/// Provides a fluent API for building configuration from multiple sources.
/// Sources are applied in the order they were added, later ones winning.
pub struct ConfigBuilder {
    sources: Vec<Box<dyn ConfigSource>>,
    validate: bool,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            validate: true,
        }
    }

    /// Add default source
    pub fn with_defaults(mut self) -> Self {
        debug!("Adding default configuration source");
        self.sources.push(Box::new(DefaultSource));
        self
    }

    /// Add file source
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        debug!("Adding file configuration source: {}", path.display());
        self.sources.push(Box::new(FileSource::new(path)));
        self
    }

    /// Add environment source
    pub fn with_env(mut self, prefix: &str) -> Self {
        debug!("Adding environment configuration source with prefix: {}", prefix);
        self.sources.push(Box::new(EnvSource::new(prefix)));
        self
    }

    /// Add command line values
    pub fn with_cli(mut self, values: ConfigValues) -> Self {
        debug!("Adding command line configuration source");
        self.sources.push(Box::new(ValuesSource::command_line(values)));
        self
    }

    /// Disable validation
    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<RelayConfig> {
        debug!("Building configuration from {} sources", self.sources.len());

        let mut values = ConfigValues::default();
        let mut config_file = None;
        let mut origins = Vec::new();

        for source in &self.sources {
            let source_type = source.source_type();
            debug!("Loading configuration from source: {}", source_type);

            let loaded = source.load()?;
            for field in loaded.defined_fields() {
                origins.push((field, source_type));
            }
            if let Some(path) = source.file() {
                config_file = Some(path.to_path_buf());
            }

            values = values.merge(loaded);
        }

        let mut config = RelayConfig::from_values(values);
        config.config_file = config_file;
        // Later sources overwrite earlier ones, matching the merge order
        for (field, source_type) in origins {
            config.sources.insert(field.to_string(), source_type);
        }

        if self.validate {
            debug!("Validating configuration");
            validate_config(&config)?;
        }

        debug!("Final configuration:");
        config.log();

        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
            .with_defaults()
            .with_file(DEFAULT_CONFIG_FILE)
            .with_env(ENV_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ValueSource;

    #[test]
    fn test_cli_overrides_defaults() {
        let config = ConfigBuilder::new()
            .with_defaults()
            .with_cli(ConfigValues {
                external: Some("127.0.0.1:7001".parse().unwrap()),
                max_queue_len: Some(10),
                ..Default::default()
            })
            .build()
            .expect("Failed to build configuration");

        assert_eq!(config.external.port(), 7001);
        assert_eq!(config.internal.port(), 9998);
        assert_eq!(config.max_queue_len, Some(10));
        assert_eq!(config.source_of("external"), ValueSource::CommandLine);
        assert_eq!(config.source_of("internal"), ValueSource::Default);
    }

    #[test]
    fn test_validation_runs_by_default() {
        let same: std::net::SocketAddr = "127.0.0.1:7002".parse().unwrap();
        let values = ConfigValues {
            external: Some(same),
            internal: Some(same),
            ..Default::default()
        };

        assert!(ConfigBuilder::new().with_cli(values.clone()).build().is_err());
        assert!(ConfigBuilder::new().with_cli(values).without_validation().build().is_ok());
    }
}
