//! Relay module
//!
//! This module implements the core of the relay: listeners on two sides,
//! FIFO pairing of their connections and bidirectional forwarding between
//! the members of each pair.
//!
//! Data flow: accept → arrival channel → pairing queue → rendezvous →
//! relay worker → socket read/write. Components communicate only by moving
//! connections through channels; no locks are involved.

pub mod listener;
pub mod message;
pub mod queue;
pub mod rendezvous;
pub mod server;
pub mod worker;

pub use listener::{accept_loop, bind_listener};
pub use message::{Connection, ConnectionPair};
pub use queue::PairingQueue;
pub use rendezvous::{Rendezvous, RendezvousSettings};
pub use server::Relay;
pub use worker::{relay_connection_pair, relay_pair, TeardownCause, WorkerSettings};
