//! Echo test peer
//!
//! Stands in for the internal population when exercising a relay by hand.
//! The pool dials the relay's internal listener and echoes back whatever
//! arrives on each connection. Whenever the pool has been idle for one
//! interval and every connection it holds has carried data at least once,
//! it dials another batch so fresh external clients always find a partner.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use log::{debug, info};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::select;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::sleep;

use crate::common::{RelayError, Result};

/// Echo pool settings
#[derive(Debug, Clone, Copy)]
pub struct EchoSettings {
    /// Relay internal address to dial
    pub relay_addr: SocketAddr,
    /// Connections dialled per batch
    pub batch_size: usize,
    /// Idle time before the pool considers dialling a new batch
    pub interval: Duration,
    /// Maximum bytes read per echo
    pub chunk_size: usize,
}

impl EchoSettings {
    /// Settings with the defaults of the `echo-server` binary
    pub fn new(relay_addr: SocketAddr) -> Self {
        Self {
            relay_addr,
            batch_size: 3,
            interval: Duration::from_secs(10),
            chunk_size: 1024,
        }
    }
}

#[derive(Debug)]
enum EchoEvent {
    /// First data seen on a connection
    Active(u64),
    /// Connection closed or failed
    Closed(u64),
}

/// Pool of echoing connections dialled into a relay
pub struct EchoPool {
    settings: EchoSettings,
    /// Connection id to "has received data"
    connections: HashMap<u64, bool>,
    last_id: u64,
    events_tx: mpsc::Sender<EchoEvent>,
    events_rx: mpsc::Receiver<EchoEvent>,
    tasks: JoinSet<()>,
}

impl EchoPool {
    /// Create an empty pool
    pub fn new(settings: EchoSettings) -> Self {
        let (events_tx, events_rx) = mpsc::channel(100);
        Self {
            settings,
            connections: HashMap::new(),
            last_id: 0,
            events_tx,
            events_rx,
            tasks: JoinSet::new(),
        }
    }

    /// Run the pool
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Connect`] as soon as a dial fails.
    pub async fn run(mut self) -> Result<()> {
        info!("Echoing connections dialled to {}", self.settings.relay_addr);

        loop {
            select! {
                Some(event) = self.events_rx.recv() => self.handle_event(event),
                Some(_) = self.tasks.join_next(), if !self.tasks.is_empty() => {},
                _ = sleep(self.settings.interval) => {
                    if self.all_active() {
                        self.dial_batch().await?;
                    }
                }
            }
        }
    }

    fn handle_event(&mut self, event: EchoEvent) {
        match event {
            EchoEvent::Active(id) => {
                if let Some(active) = self.connections.get_mut(&id) {
                    *active = true;
                }
            }
            EchoEvent::Closed(id) => {
                self.connections.remove(&id);
                debug!("Echo connection #{} closed, {} left", id, self.connections.len());
            }
        }
    }

    /// Whether every held connection has received data (vacuously true when empty)
    fn all_active(&self) -> bool {
        self.connections.values().all(|active| *active)
    }

    async fn dial_batch(&mut self) -> Result<()> {
        for _ in 0..self.settings.batch_size {
            let addr = self.settings.relay_addr;
            let stream = TcpStream::connect(addr)
                .await
                .map_err(|source| RelayError::Connect { addr, source })?;

            self.last_id += 1;
            let id = self.last_id;
            self.connections.insert(id, false);
            info!("Echo connection #{} established to {}", id, addr);

            self.tasks.spawn(echo(id, stream, self.settings.chunk_size, self.events_tx.clone()));
        }
        Ok(())
    }
}

/// Write every chunk read from `stream` straight back to it
async fn echo(id: u64, mut stream: TcpStream, chunk_size: usize, events: mpsc::Sender<EchoEvent>) {
    let mut buffer = vec![0u8; chunk_size];
    let mut active = false;

    loop {
        let n = match stream.read(&mut buffer).await {
            Ok(0) => {
                debug!("Echo connection #{}: input closed", id);
                break;
            }
            Ok(n) => n,
            Err(e) => {
                debug!("Echo connection #{}: read failed: {}", id, e);
                break;
            }
        };

        debug!("Echo connection #{}: received {} bytes", id, n);
        if !active {
            active = true;
            let _ = events.send(EchoEvent::Active(id)).await;
        }

        if let Err(e) = stream.write_all(&buffer[..n]).await {
            debug!("Echo connection #{}: error writing data: {}", id, e);
            break;
        }
    }

    let _ = events.send(EchoEvent::Closed(id)).await;
}
