//! Relay server
//!
//! Ties the listener manager, the rendezvous loop and the relay workers
//! together.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info};
use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::common::{RelayError, Result, Side};
use crate::config::RelayConfig;
use super::listener::{accept_loop, bind_listener};
use super::rendezvous::{Rendezvous, RendezvousSettings};
use super::worker::{relay_connection_pair, WorkerSettings};

/// Rendezvous relay with both listeners bound
pub struct Relay {
    /// Listener for the external population
    external: TcpListener,
    /// Listener for the internal population
    internal: TcpListener,
    /// Relay configuration
    config: Arc<RelayConfig>,
}

impl Relay {
    /// Bind the external and internal listeners
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Bind`] if either address cannot be bound.
    pub fn bind(config: impl Into<Arc<RelayConfig>>) -> Result<Self> {
        let config = config.into();

        info!("Listening to external {}", config.external);
        let external = bind_listener(config.external)?;

        info!("Listening to internal {}", config.internal);
        let internal = bind_listener(config.internal)?;

        Ok(Self { external, internal, config })
    }

    /// Address the external listener is bound to
    pub fn external_addr(&self) -> Result<SocketAddr> {
        Ok(self.external.local_addr()?)
    }

    /// Address the internal listener is bound to
    pub fn internal_addr(&self) -> Result<SocketAddr> {
        Ok(self.internal.local_addr()?)
    }

    /// Accept, pair and relay connections
    ///
    /// Runs until an accept loop fails. Dropping the returned future stops
    /// the accept loops and every active pair.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Accept`] on the first accept failure.
    pub async fn run(self) -> Result<()> {
        let capacity = self.config.channel_capacity;
        let (external_tx, external_rx) = mpsc::channel(capacity);
        let (internal_tx, internal_rx) = mpsc::channel(capacity);

        let mut accept_loops = JoinSet::new();
        accept_loops.spawn(accept_loop(Side::External, self.external, external_tx));
        accept_loops.spawn(accept_loop(Side::Internal, self.internal, internal_tx));

        let worker_settings = WorkerSettings::from_config(&self.config);
        let rendezvous = Rendezvous::new(
            external_rx,
            internal_rx,
            RendezvousSettings::from_config(&self.config),
        );
        let pairing = rendezvous.run(move |pair| relay_connection_pair(pair, worker_settings));
        tokio::pin!(pairing);

        loop {
            select! {
                Some(result) = accept_loops.join_next() => match result {
                    Ok(Ok(())) => continue,
                    Ok(Err(e)) => return Err(e),
                    Err(e) => {
                        error!("Accept loop failed: {}", e);
                        return Err(RelayError::Other(format!("Accept loop failed: {}", e)));
                    }
                },
                pairs = &mut pairing => {
                    info!("Rendezvous loop finished after {} pairs", pairs);
                    return Ok(());
                }
            }
        }
    }
}
