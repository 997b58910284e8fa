//! Connection and pair types
//!
//! Values moved between the accept loops, the rendezvous loop and the relay
//! workers. Ownership travels with the value; nothing here is shared.

use std::fmt;
use std::net::SocketAddr;
use tokio::net::TcpStream;

/// An accepted connection waiting to be paired
pub struct Connection {
    /// Accepted stream
    pub stream: TcpStream,
    /// Remote address of the client
    pub peer_addr: SocketAddr,
}

impl Connection {
    /// Wrap an accepted stream
    pub fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Self { stream, peer_addr }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("peer_addr", &self.peer_addr)
            .field("stream", &"<TcpStream>")
            .finish()
    }
}

/// One external and one internal connection matched by the rendezvous loop
///
/// Lives exactly as long as the relay worker it is handed to.
#[derive(Debug)]
pub struct ConnectionPair<C> {
    /// Sequential pair number, starting at 1
    pub id: u64,
    /// Connection from the external listener
    pub external: C,
    /// Connection from the internal listener
    pub internal: C,
}
