//! Rendezvous loop
//!
//! The single coordinating task of the relay. It drains both arrival
//! channels into their pairing queues and, after every event, matches the
//! oldest waiting external connection with the oldest waiting internal one.
//! Matched pairs are handed to a worker spawned into a `JoinSet` owned by
//! the loop, so dispatch never blocks further arrivals.
//!
//! Only this task touches the queues. Queued connections are not probed
//! before pairing: one that died while waiting is still paired, and its
//! worker notices on first read or write.

use std::future::Future;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::select;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::sleep;

use crate::common::Side;
use crate::config::RelayConfig;
use super::message::ConnectionPair;
use super::queue::PairingQueue;

/// Tuning knobs of the rendezvous loop
#[derive(Debug, Clone, Copy)]
pub struct RendezvousSettings {
    /// Idle time after which a heartbeat line is logged
    pub heartbeat: Duration,
    /// Initial capacity of each pairing queue
    pub queue_capacity: usize,
    /// Optional cap on waiting connections per side; `None` is unbounded
    pub max_queue_len: Option<usize>,
}

impl RendezvousSettings {
    /// Settings taken from the relay configuration
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            heartbeat: config.heartbeat(),
            queue_capacity: config.queue_capacity,
            max_queue_len: config.max_queue_len,
        }
    }
}

impl Default for RendezvousSettings {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}

/// Pairs arrivals from the external and internal sides in FIFO order
pub struct Rendezvous<C> {
    external_rx: mpsc::Receiver<C>,
    internal_rx: mpsc::Receiver<C>,
    external_queue: PairingQueue<C>,
    internal_queue: PairingQueue<C>,
    settings: RendezvousSettings,
    next_pair_id: u64,
}

impl<C: Send + 'static> Rendezvous<C> {
    /// Create a rendezvous loop fed by the two arrival channels
    pub fn new(
        external_rx: mpsc::Receiver<C>,
        internal_rx: mpsc::Receiver<C>,
        settings: RendezvousSettings,
    ) -> Self {
        Self {
            external_rx,
            internal_rx,
            external_queue: PairingQueue::with_capacity(settings.queue_capacity),
            internal_queue: PairingQueue::with_capacity(settings.queue_capacity),
            settings,
            next_pair_id: 1,
        }
    }

    /// Queue an arrival from `side`
    ///
    /// Returns `false` if the arrival was dropped because the queue of that
    /// side is at its configured cap. The dropped connection is closed.
    pub fn enqueue(&mut self, side: Side, connection: C) -> bool {
        let queue = match side {
            Side::External => &mut self.external_queue,
            Side::Internal => &mut self.internal_queue,
        };

        if let Some(cap) = self.settings.max_queue_len {
            if queue.len() >= cap {
                warn!("{} queue is full ({} waiting), dropping connection", side, queue.len());
                return false;
            }
        }

        queue.push(connection);
        debug!("Queued {} connection, {} waiting", side, queue.len());
        true
    }

    /// Take the oldest connection of each side if both sides have one waiting
    pub fn try_pair(&mut self) -> Option<ConnectionPair<C>> {
        if self.external_queue.is_empty() || self.internal_queue.is_empty() {
            return None;
        }

        let external = self.external_queue.pop()?;
        let internal = self.internal_queue.pop()?;
        let id = self.next_pair_id;
        self.next_pair_id += 1;

        Some(ConnectionPair { id, external, internal })
    }

    /// Number of connections waiting on `side`
    pub fn waiting(&self, side: Side) -> usize {
        match side {
            Side::External => self.external_queue.len(),
            Side::Internal => self.internal_queue.len(),
        }
    }

    /// Run the loop, spawning `dispatch(pair)` for every pair
    ///
    /// Returns once both arrival channels are closed and every spawned
    /// worker has finished, with the number of pairs dispatched.
    pub async fn run<F, Fut>(mut self, mut dispatch: F) -> u64
    where
        F: FnMut(ConnectionPair<C>) -> Fut,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        let mut workers = JoinSet::new();
        let mut external_open = true;
        let mut internal_open = true;
        let mut dispatched = 0u64;

        info!("Starting main run loop");

        while external_open || internal_open {
            select! {
                arrival = self.external_rx.recv(), if external_open => match arrival {
                    Some(connection) => {
                        self.enqueue(Side::External, connection);
                    }
                    None => {
                        info!("External arrival channel closed");
                        external_open = false;
                    }
                },
                arrival = self.internal_rx.recv(), if internal_open => match arrival {
                    Some(connection) => {
                        self.enqueue(Side::Internal, connection);
                    }
                    None => {
                        info!("Internal arrival channel closed");
                        internal_open = false;
                    }
                },
                Some(result) = workers.join_next(), if !workers.is_empty() => {
                    if let Err(e) = result {
                        error!("Relay worker failed: {}", e);
                    }
                },
                _ = sleep(self.settings.heartbeat) => {
                    info!(
                        "No connections, tick ({} external and {} internal waiting, {} active pairs)",
                        self.external_queue.len(),
                        self.internal_queue.len(),
                        workers.len()
                    );
                },
            }

            if let Some(pair) = self.try_pair() {
                debug!("Dispatching pair #{}", pair.id);
                workers.spawn(dispatch(pair));
                dispatched += 1;
            }
        }

        info!(
            "Arrival channels closed, waiting for {} active pairs ({} external and {} internal left unpaired)",
            workers.len(),
            self.external_queue.len(),
            self.internal_queue.len()
        );

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                error!("Relay worker failed: {}", e);
            }
        }

        dispatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(capacity: usize) -> (
        mpsc::Sender<u32>,
        mpsc::Sender<u32>,
        Rendezvous<u32>,
    ) {
        let (external_tx, external_rx) = mpsc::channel(capacity);
        let (internal_tx, internal_rx) = mpsc::channel(capacity);
        let rendezvous = Rendezvous::new(external_rx, internal_rx, RendezvousSettings::default());
        (external_tx, internal_tx, rendezvous)
    }

    #[test]
    fn test_try_pair_needs_both_sides() {
        let (_e, _i, mut rendezvous) = channels(1);

        rendezvous.enqueue(Side::External, 1);
        rendezvous.enqueue(Side::External, 2);
        assert!(rendezvous.try_pair().is_none());
        assert_eq!(rendezvous.waiting(Side::External), 2);

        rendezvous.enqueue(Side::Internal, 101);
        let pair = rendezvous.try_pair().expect("both sides are waiting");
        assert_eq!((pair.id, pair.external, pair.internal), (1, 1, 101));

        rendezvous.enqueue(Side::Internal, 102);
        let pair = rendezvous.try_pair().expect("both sides are waiting");
        assert_eq!((pair.id, pair.external, pair.internal), (2, 2, 102));
        assert!(rendezvous.try_pair().is_none());
    }

    #[test]
    fn test_cap_drops_excess_arrivals() {
        let (external_tx, external_rx) = mpsc::channel::<u32>(1);
        let (_internal_tx, internal_rx) = mpsc::channel::<u32>(1);
        drop(external_tx);
        let settings = RendezvousSettings {
            max_queue_len: Some(2),
            ..RendezvousSettings::default()
        };
        let mut rendezvous = Rendezvous::new(external_rx, internal_rx, settings);

        assert!(rendezvous.enqueue(Side::External, 1));
        assert!(rendezvous.enqueue(Side::External, 2));
        assert!(!rendezvous.enqueue(Side::External, 3));
        assert_eq!(rendezvous.waiting(Side::External), 2);

        // the other side has its own cap
        assert!(rendezvous.enqueue(Side::Internal, 101));
        let pair = rendezvous.try_pair().unwrap();
        assert_eq!((pair.external, pair.internal), (1, 101));
        assert!(rendezvous.enqueue(Side::External, 4));
    }

    #[tokio::test]
    async fn test_fifo_pairing_for_any_interleaving() {
        const N: u32 = 50;
        let (external_tx, internal_tx, rendezvous) = channels(100);
        let (pairs_tx, mut pairs_rx) = mpsc::unbounded_channel();

        let run = tokio::spawn(rendezvous.run(move |pair| {
            let pairs_tx = pairs_tx.clone();
            async move {
                let _ = pairs_tx.send((pair.id, pair.external, pair.internal));
            }
        }));

        // irregular interleaving: bursts of externals, then bursts of internals
        let mut next_external = 0;
        let mut next_internal = 0;
        let mut round = 0;
        while next_external < N || next_internal < N {
            for _ in 0..(round % 4) {
                if next_external < N {
                    external_tx.send(next_external).await.unwrap();
                    next_external += 1;
                }
            }
            for _ in 0..((round + 2) % 3) {
                if next_internal < N {
                    internal_tx.send(1000 + next_internal).await.unwrap();
                    next_internal += 1;
                }
            }
            round += 1;
        }
        drop(external_tx);
        drop(internal_tx);

        assert_eq!(run.await.unwrap(), N as u64);

        let mut pairs = Vec::new();
        while let Some(pair) = pairs_rx.recv().await {
            pairs.push(pair);
        }
        pairs.sort();
        assert_eq!(pairs.len(), N as usize);
        for (i, (id, external, internal)) in pairs.into_iter().enumerate() {
            assert_eq!(id, i as u64 + 1);
            assert_eq!(external, i as u32);
            assert_eq!(internal, 1000 + i as u32);
        }
    }

    #[tokio::test]
    async fn test_unmatched_arrivals_are_not_dispatched() {
        let (external_tx, internal_tx, rendezvous) = channels(10);
        for i in 0..3 {
            external_tx.send(i).await.unwrap();
        }
        internal_tx.send(100).await.unwrap();
        drop(external_tx);
        drop(internal_tx);

        let dispatched = rendezvous.run(|pair| async move { pair.id }).await;
        assert_eq!(dispatched, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_keeps_loop_running() {
        let (external_tx, internal_tx, rendezvous) = channels(10);
        let (pairs_tx, mut pairs_rx) = mpsc::unbounded_channel();

        let run = tokio::spawn(rendezvous.run(move |pair| {
            let pairs_tx = pairs_tx.clone();
            async move {
                let _ = pairs_tx.send(pair.id);
            }
        }));

        external_tx.send(1).await.unwrap();
        // several idle heartbeats pass before the partner shows up
        tokio::time::sleep(Duration::from_secs(35)).await;
        internal_tx.send(2).await.unwrap();

        assert_eq!(pairs_rx.recv().await, Some(1));
        drop(external_tx);
        drop(internal_tx);
        assert_eq!(run.await.unwrap(), 1);
    }
}
