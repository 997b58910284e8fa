//! Logging helpers
//!
//! This module wires the `log` facade to `env_logger`.
//!
//! The logger is installed once, as early as possible, and its level can be
//! adjusted afterwards with [`set_log_level`] once the configuration is known.
//! When `RUST_LOG` is set it owns the filter and configured levels are ignored.

use log::LevelFilter;

/// Level used when a configured level cannot be parsed
const FALLBACK_LEVEL: LevelFilter = LevelFilter::Info;

/// Parse a log level, falling back to `info` for unknown values
///
/// Accepts `off`, `error`, `warn`, `info`, `debug` and `trace`, in any case.
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(FALLBACK_LEVEL)
}

/// Whether `level` names a log level
pub fn is_valid_level(level: &str) -> bool {
    level.trim().parse::<LevelFilter>().is_ok()
}

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `level` when it is set. Calling this
/// more than once leaves the first logger in place.
///
/// # Parameters
///
/// * `level` - Log level (error, warn, info, debug, trace)
pub fn init_logger(level: &str) {
    // Let every record through env_logger; the global max level does the filtering
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", "trace");

    // A logger may already be installed (tests, embedding applications)
    if env_logger::Builder::from_env(env).try_init().is_ok() {
        set_log_level(level);
    }
}

/// Change the level of an installed logger
///
/// Returns the level in effect afterwards.
pub fn set_log_level(level: &str) -> LevelFilter {
    if std::env::var_os("RUST_LOG").is_some() {
        return log::max_level();
    }

    let filter = parse_level(level);
    log::set_max_level(filter);
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("loud"), LevelFilter::Info);
        assert_eq!(parse_level(""), LevelFilter::Info);

        assert!(is_valid_level("trace"));
        assert!(!is_valid_level("loud"));
    }

    #[test]
    fn test_level_adjusted_after_init() {
        init_logger("error");
        init_logger("info");

        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(set_log_level("debug"), LevelFilter::Debug);
            assert_eq!(log::max_level(), LevelFilter::Debug);

            // an unknown level falls back instead of silencing the relay
            assert_eq!(set_log_level("loud"), LevelFilter::Info);
            assert_eq!(log::max_level(), LevelFilter::Info);
        }
    }
}
