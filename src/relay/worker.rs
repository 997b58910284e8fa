//! Relay worker
//!
//! Forwards bytes in both directions between the two connections of a pair.
//!
//! Each connection gets a read pump that republishes chunks on its own
//! channel. A single forwarding loop selects over both channels and writes
//! every chunk to the opposite connection, so byte order is preserved per
//! direction. The first closed channel or failed write tears the pair down:
//! both pumps are stopped and both connections are shut down and released.

use std::fmt;
use std::io;

use bytes::Bytes;
use log::{debug, info};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::common::Side;
use crate::config::RelayConfig;
use super::message::{Connection, ConnectionPair};

/// Tuning knobs of a relay worker
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    /// Maximum bytes read per pump iteration
    pub chunk_size: usize,
    /// Chunks a pump may buffer ahead of the forwarding loop
    pub channel_capacity: usize,
}

impl WorkerSettings {
    /// Settings taken from the relay configuration
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            channel_capacity: config.channel_capacity,
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}

/// Why a relay worker stopped forwarding
#[derive(Debug)]
pub enum TeardownCause {
    /// The pump of this side stopped: the peer closed or a read failed
    InputClosed(Side),
    /// Writing to this side failed
    WriteFailed {
        /// Side whose connection rejected the write
        side: Side,
        /// Write error
        error: io::Error,
    },
}

impl fmt::Display for TeardownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputClosed(side) => write!(f, "{} input channel closed", side),
            Self::WriteFailed { side, error } => {
                write!(f, "error writing data to {} connection: {}", side, error)
            }
        }
    }
}

/// Relay an accepted pair of TCP connections until either side is done
pub async fn relay_connection_pair(
    pair: ConnectionPair<Connection>,
    settings: WorkerSettings,
) -> TeardownCause {
    let ConnectionPair { id, external, internal } = pair;
    info!(
        "Pair #{}: relaying {} (external) <-> {} (internal)",
        id, external.peer_addr, internal.peer_addr
    );

    let cause = relay_pair(id, external.stream, internal.stream, settings).await;

    info!("Pair #{} closed: {}", id, cause);
    cause
}

/// Forward bytes between `external` and `internal` until one side closes or fails
///
/// Both streams are closed before this returns, whatever ended the relay.
/// Dropping the future early releases them as well, since the pumps live in
/// a `JoinSet` owned by this call.
pub async fn relay_pair<E, I>(
    pair_id: u64,
    external: E,
    internal: I,
    settings: WorkerSettings,
) -> TeardownCause
where
    E: AsyncRead + AsyncWrite + Send + 'static,
    I: AsyncRead + AsyncWrite + Send + 'static,
{
    let (external_reader, mut external_writer) = tokio::io::split(external);
    let (internal_reader, mut internal_writer) = tokio::io::split(internal);

    let (external_tx, mut external_rx) = mpsc::channel::<Bytes>(settings.channel_capacity);
    let (internal_tx, mut internal_rx) = mpsc::channel::<Bytes>(settings.channel_capacity);

    let mut pumps = JoinSet::new();
    pumps.spawn(pump(pair_id, Side::External, external_reader, external_tx, settings.chunk_size));
    pumps.spawn(pump(pair_id, Side::Internal, internal_reader, internal_tx, settings.chunk_size));

    let cause = loop {
        select! {
            chunk = external_rx.recv() => match chunk {
                Some(data) => {
                    if let Err(error) = internal_writer.write_all(&data).await {
                        break TeardownCause::WriteFailed { side: Side::Internal, error };
                    }
                }
                None => break TeardownCause::InputClosed(Side::External),
            },
            chunk = internal_rx.recv() => match chunk {
                Some(data) => {
                    if let Err(error) = external_writer.write_all(&data).await {
                        break TeardownCause::WriteFailed { side: Side::External, error };
                    }
                }
                None => break TeardownCause::InputClosed(Side::Internal),
            },
        }
    };

    // Stopping the pumps drops both read halves
    pumps.shutdown().await;

    if let Err(e) = external_writer.shutdown().await {
        debug!("Pair #{}: external shutdown: {}", pair_id, e);
    }
    if let Err(e) = internal_writer.shutdown().await {
        debug!("Pair #{}: internal shutdown: {}", pair_id, e);
    }

    // Last halves go here, which closes both streams
    drop(external_writer);
    drop(internal_writer);

    cause
}

/// Read `reader` in chunks of at most `chunk_size` bytes and publish them in order
///
/// EOF and read errors both end the pump, which closes its channel.
async fn pump<R>(
    pair_id: u64,
    side: Side,
    mut reader: R,
    output: mpsc::Sender<Bytes>,
    chunk_size: usize,
) where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; chunk_size];
    let mut total_bytes = 0u64;

    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => {
                debug!("Pair #{}: {} connection closed by peer", pair_id, side);
                break;
            }
            Ok(n) => {
                total_bytes += n as u64;
                debug!("Pair #{}: received {} bytes from {}", pair_id, n, side);
                if output.send(Bytes::copy_from_slice(&buffer[..n])).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("Pair #{}: read from {} failed: {}", pair_id, side, e);
                break;
            }
        }
    }

    debug!("Pair #{}: {} pump read {} bytes total", pair_id, side, total_bytes);
}
