// Listener module
// Binds the TCP listener the serve loop accepts from

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::error::{Result, ServerError};

/// Pending connections queued by the kernel while one request is handled
const BACKLOG: i32 = 128;

/// Create a `TcpListener` bound to `addr`.
///
/// `SO_REUSEADDR` lets a restarted server rebind a port still in `TIME_WAIT`.
/// A port held by a live listener is still refused, which is reported as
/// [`ServerError::Bind`].
///
/// Must be called from within a tokio runtime.
pub fn bind_listener(addr: SocketAddr) -> Result<TcpListener> {
    create_listener(addr).map_err(|source| ServerError::Bind { addr, source })
}

fn create_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    // Required before handing the socket to tokio
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
