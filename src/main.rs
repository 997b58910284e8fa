//! Rendezvous Relay Command Line Tool
//!
//! This binary is the command-line interface for the rendezvous relay.

use std::process;

use clap::Parser;
use log::{error, info};

use rendezvous_relay::common::{init_logger, parse_socket_addr, set_log_level, Result};
use rendezvous_relay::config::defaults::LOG_LEVEL_STR;
use rendezvous_relay::config::{ConfigBuilder, ConfigValues, RelayConfig, ENV_PREFIX};
use rendezvous_relay::{Relay, APP_NAME, VERSION};

/// Rendezvous Relay: pair external and internal TCP connections and relay between them
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// External listen address [default: 127.0.0.1:9999]
    #[clap(long)]
    external: Option<String>,

    /// Internal listen address [default: 127.0.0.1:9998]
    #[clap(long)]
    internal: Option<String>,

    /// Load configuration from a JSON file
    #[clap(long)]
    config_file: Option<String>,

    /// Log level (error, warn, info, debug, trace) [default: info]
    #[clap(long)]
    log_level: Option<String>,

    /// Maximum bytes read per chunk [default: 1024]
    #[clap(long)]
    chunk_size: Option<usize>,

    /// Capacity of arrival and pump channels [default: 100]
    #[clap(long)]
    channel_capacity: Option<usize>,

    /// Seconds of idleness between heartbeat log lines [default: 10]
    #[clap(long)]
    heartbeat_secs: Option<u64>,

    /// Cap on connections waiting per side; unbounded when not set
    #[clap(long)]
    max_queue_len: Option<usize>,
}

impl Args {
    /// Values given on the command line
    fn values(&self) -> Result<ConfigValues> {
        Ok(ConfigValues {
            external: self.external.as_deref().map(parse_socket_addr).transpose()?,
            internal: self.internal.as_deref().map(parse_socket_addr).transpose()?,
            log_level: self.log_level.clone(),
            chunk_size: self.chunk_size,
            channel_capacity: self.channel_capacity,
            heartbeat_secs: self.heartbeat_secs,
            max_queue_len: self.max_queue_len,
            ..Default::default()
        })
    }
}

fn load_config(args: &Args) -> Result<RelayConfig> {
    let mut builder = ConfigBuilder::new().with_defaults();
    if let Some(config_file) = &args.config_file {
        builder = builder.with_file(config_file);
    }

    Ok(builder
        .with_env(ENV_PREFIX)
        .with_cli(args.values()?)
        .build()?)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Start logging before the configuration is loaded so its warnings show up
    init_logger(args.log_level.as_deref().unwrap_or(LOG_LEVEL_STR));

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(e.exit_code());
        }
    };

    set_log_level(&config.log_level);
    info!("Starting {} v{}", APP_NAME, VERSION);
    if let Some(path) = &config.config_file {
        info!("Loaded configuration from {}", path.display());
    }

    let relay = match Relay::bind(config) {
        Ok(relay) => relay,
        Err(e) => {
            error!("{}", e);
            process::exit(e.exit_code());
        }
    };

    info!("Relay ready, press Ctrl+C to stop");

    tokio::select! {
        result = relay.run() => {
            if let Err(e) = result {
                error!("{}", e);
                process::exit(e.exit_code());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }
}
