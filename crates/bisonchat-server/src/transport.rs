//! TCP transport.
//!
//! One listening socket; each accepted connection is a byte stream the
//! client frames into newline-terminated command lines. The listen
//! backlog is explicit, so the boundary constants (port, backlog) are the
//! only transport configuration there is.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpSocket, TcpStream};

use crate::error::ServerError;

/// TCP listener wrapper.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Bind a listening socket with the given backlog.
    ///
    /// Must run inside a Tokio runtime. Address reuse is enabled so quick
    /// restarts do not trip over sockets in TIME_WAIT.
    pub fn bind(address: &str, backlog: u32) -> Result<Self, ServerError> {
        let addr: SocketAddr = address
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid bind address '{address}': {e}")))?;

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(backlog)?;

        tracing::info!("TCP transport bound to {}", addr);

        Ok(Self { listener })
    }

    /// Accept the next connection. Blocks until one is available.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ServerError> {
        Ok(self.listener.accept().await?)
    }

    /// Local address the transport is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transport_binds_ephemeral_port() {
        let transport = TcpTransport::bind("127.0.0.1:0", 2).unwrap();
        let addr = transport.local_addr().unwrap();
        assert_ne!(addr.port(), 0, "should have assigned a port");
    }

    #[tokio::test]
    async fn transport_rejects_invalid_address() {
        let result = TcpTransport::bind("not-an-address", 2);
        assert!(matches!(result, Err(ServerError::Config(_))));
    }
}
