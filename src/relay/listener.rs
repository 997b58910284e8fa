//! Listener management
//!
//! Binds the external and internal listening sockets and runs one accept
//! loop per side. Each accepted connection is published on that side's
//! bounded arrival channel; a full channel stalls accepts on that side only.

use std::net::SocketAddr;

use log::{debug, error, info};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::common::{RelayError, Result, Side};
use crate::config::defaults;
use super::message::Connection;

/// Bind a listening socket
///
/// # Errors
///
/// Returns [`RelayError::Bind`] if the socket cannot be created, bound or
/// put into listening mode.
pub fn bind_listener(addr: SocketAddr) -> Result<TcpListener> {
    let bind_error = |source| RelayError::Bind { addr, source };

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(bind_error)?;
    socket.set_reuse_address(true).map_err(bind_error)?;
    socket.set_nonblocking(true).map_err(bind_error)?;
    socket.bind(&addr.into()).map_err(bind_error)?;
    socket.listen(defaults::listen_backlog()).map_err(bind_error)?;

    TcpListener::from_std(socket.into()).map_err(bind_error)
}

/// Accept connections forever, delivering them on `arrivals`
///
/// Returns `Ok(())` once the receiving side of `arrivals` is gone.
///
/// # Errors
///
/// The first accept failure ends the loop with [`RelayError::Accept`]; no
/// distinction is made between transient and permanent failures.
pub async fn accept_loop(
    side: Side,
    listener: TcpListener,
    arrivals: mpsc::Sender<Connection>,
) -> Result<()> {
    match listener.local_addr() {
        Ok(addr) => info!("Listening for {} connections on {}", side, addr),
        Err(_) => info!("Listening for {} connections", side),
    }

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(source) => {
                error!("Could not accept {} connection: {}", side, source);
                return Err(RelayError::Accept { side, source });
            }
        };

        info!("Got a {} connection from {}", side, peer_addr);

        if arrivals.send(Connection::new(stream, peer_addr)).await.is_err() {
            debug!("{} arrival channel closed, stopping accept loop", side);
            return Ok(());
        }
    }
}
