//! Configuration sources
//!
//! This module defines traits and implementations for loading configuration
//! from different sources.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, warn};

use crate::common::parse_socket_addr;
use crate::config::error::{ConfigError, Result};
use crate::config::types::{ConfigValues, ValueSource};

/// Configuration source trait
pub trait ConfigSource {
    /// Load the values this source defines
    fn load(&self) -> Result<ConfigValues>;

    /// Get the source type
    fn source_type(&self) -> ValueSource;

    /// File backing this source, if any
    fn file(&self) -> Option<&Path> {
        None
    }
}

/// Default configuration source
///
/// Defines nothing; defaults are filled in when the configuration is resolved.
pub struct DefaultSource;

impl ConfigSource for DefaultSource {
    fn load(&self) -> Result<ConfigValues> {
        debug!("Loading default configuration");
        Ok(ConfigValues::default())
    }

    fn source_type(&self) -> ValueSource {
        ValueSource::Default
    }
}

/// JSON file configuration source
pub struct FileSource {
    pub path: PathBuf,
}

impl FileSource {
    /// Create a new file source
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<ConfigValues> {
        debug!("Loading configuration from file: {}", self.path.display());

        if !self.path.exists() {
            warn!("Configuration file not found: {}", self.path.display());
            return Ok(ConfigValues::default());
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::FileReadError(self.path.clone(), e.to_string()))?;

        serde_json::from_str::<ConfigValues>(&contents).map_err(|e| {
            ConfigError::ParseError(format!("Error parsing {}: {}", self.path.display(), e))
        })
    }

    fn source_type(&self) -> ValueSource {
        ValueSource::File
    }

    fn file(&self) -> Option<&Path> {
        if self.path.exists() {
            Some(self.path.as_path())
        } else {
            None
        }
    }
}

/// Environment variable configuration source
pub struct EnvSource {
    pub prefix: String,
}

impl EnvSource {
    /// Create a new environment source
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    fn var(&self, name: &str) -> Option<(String, String)> {
        let full_name = format!("{}{}", self.prefix, name);
        env::var(&full_name).ok().map(|value| {
            debug!("Found environment variable {}={}", full_name, value);
            (full_name, value)
        })
    }

    fn parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>>
    where
        T::Err: std::fmt::Display,
    {
        match self.var(name) {
            Some((full_name, value)) => value
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue(full_name, e.to_string())),
            None => Ok(None),
        }
    }

    fn address(&self, name: &str) -> Result<Option<std::net::SocketAddr>> {
        match self.var(name) {
            Some((full_name, value)) => parse_socket_addr(&value)
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue(full_name, e.to_string())),
            None => Ok(None),
        }
    }
}

impl ConfigSource for EnvSource {
    fn load(&self) -> Result<ConfigValues> {
        debug!("Loading configuration from environment variables with prefix: {}", self.prefix);

        Ok(ConfigValues {
            external: self.address("EXTERNAL")?,
            internal: self.address("INTERNAL")?,
            log_level: self.var("LOG_LEVEL").map(|(_, value)| value),
            chunk_size: self.parsed("CHUNK_SIZE")?,
            channel_capacity: self.parsed("CHANNEL_CAPACITY")?,
            heartbeat_secs: self.parsed("HEARTBEAT_SECS")?,
            queue_capacity: self.parsed("QUEUE_CAPACITY")?,
            max_queue_len: self.parsed("MAX_QUEUE_LEN")?,
        })
    }

    fn source_type(&self) -> ValueSource {
        ValueSource::Environment
    }
}

/// Source wrapping values that were already parsed, such as command line arguments
pub struct ValuesSource {
    values: ConfigValues,
    source: ValueSource,
}

impl ValuesSource {
    /// Values taken from the command line
    pub fn command_line(values: ConfigValues) -> Self {
        Self {
            values,
            source: ValueSource::CommandLine,
        }
    }
}

impl ConfigSource for ValuesSource {
    fn load(&self) -> Result<ConfigValues> {
        Ok(self.values.clone())
    }

    fn source_type(&self) -> ValueSource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_defines_nothing() {
        let source = FileSource::new("does-not-exist.json");
        assert_eq!(source.load().unwrap(), ConfigValues::default());
        assert!(source.file().is_none());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let result = FileSource::new(file.path()).load();
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_values_source() {
        let values = ConfigValues {
            chunk_size: Some(4096),
            ..Default::default()
        };
        let source = ValuesSource::command_line(values.clone());

        assert_eq!(source.load().unwrap(), values);
        assert_eq!(source.source_type(), ValueSource::CommandLine);
    }
}
