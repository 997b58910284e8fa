//! Configuration module
//!
//! This module handles application configuration, including loading from
//! different sources (files, environment variables, command line arguments)
//! and validating the configuration.
//!
//! Sources are applied from lowest to highest priority:
//!
//! 1. Default values
//! 2. JSON configuration file
//! 3. Environment variables prefixed with [`ENV_PREFIX`]
//! 4. Command line arguments

pub mod builder;
pub mod defaults;
pub mod error;
pub mod source;
pub mod types;
pub mod validator;

pub use builder::ConfigBuilder;
pub use defaults::{ENV_PREFIX, DEFAULT_CONFIG_FILE};
pub use error::ConfigError;
pub use source::{ConfigSource, DefaultSource, FileSource, EnvSource, ValuesSource};
pub use types::{ConfigValues, RelayConfig, ValueSource};
pub use validator::{validate_config, ConfigValidator};
