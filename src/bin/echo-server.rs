//! Echo server
//!
//! Test peer for the rendezvous relay: dials the relay's internal listener
//! and echoes everything received on those connections.

use std::process;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use rendezvous_relay::common::{init_logger, parse_socket_addr, Result};
use rendezvous_relay::echo::{EchoPool, EchoSettings};

/// Echo peer dialling into a rendezvous relay
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Relay internal address to dial
    #[clap(long, default_value = "127.0.0.1:9998")]
    relay: String,

    /// Connections dialled per batch
    #[clap(long, default_value_t = 3)]
    batch: usize,

    /// Idle seconds before another batch is considered
    #[clap(long, default_value_t = 10)]
    interval_secs: u64,

    /// Log level
    #[clap(long, default_value = "info")]
    log_level: String,
}

async fn run(args: Args) -> Result<()> {
    let mut settings = EchoSettings::new(parse_socket_addr(&args.relay)?);
    settings.batch_size = args.batch;
    settings.interval = Duration::from_secs(args.interval_secs);

    EchoPool::new(settings).run().await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(&args.log_level);
    info!("Starting echo server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args).await {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}
