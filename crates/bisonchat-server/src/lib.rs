//! BisonChat production server.
//!
//! Runtime glue around [`bisonchat_core`]: a TCP accept loop that spawns
//! one session worker per connection, and a shutdown coordinator that
//! turns an interrupt signal into an exclusive sweep of the shared
//! directory.
//!
//! # Components
//!
//! - [`Server`]: accept loop, connection cap, shutdown coordination
//! - [`TcpTransport`]: listening socket (bind/accept)
//! - session workers (internal): per-connection read-dispatch-reply loops

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod session;
mod transport;

use std::sync::Arc;

use bisonchat_core::Directory;
pub use error::ServerError;
pub use transport::TcpTransport;

/// Server configuration.
///
/// The boundary constants: everything else about the service is fixed by
/// the protocol.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (e.g. "0.0.0.0:8888").
    pub bind_address: String,
    /// Listen backlog.
    pub backlog: u32,
    /// Maximum concurrent connections; connections accepted beyond this
    /// are dropped.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:8888".to_string(), backlog: 2, max_connections: 30 }
    }
}

/// Production BisonChat server.
///
/// Owns the listening socket and the shared [`Directory`] every session
/// worker operates on.
pub struct Server {
    transport: TcpTransport,
    directory: Arc<Directory>,
    config: ServerConfig,
}

impl Server {
    /// Bind the listening socket. The directory starts with the default
    /// room already created.
    pub fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let transport = TcpTransport::bind(&config.bind_address, config.backlog)?;
        Ok(Self { transport, directory: Arc::new(Directory::new()), config })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        self.transport.local_addr()
    }

    /// Run until an interrupt signal arrives.
    ///
    /// The accept loop and the shutdown coordinator race: on interrupt,
    /// the coordinator takes the directory's exclusive write access,
    /// closes every live connection and clears all registries, then this
    /// returns and the process terminates. Session workers blocked on
    /// reads observe the close as a normal disconnect.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("server listening on {}", self.local_addr()?);

        tokio::select! {
            () = self.accept_loop() => Ok(()),
            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracing::info!("interrupt received, shutting down");
                self.directory.shutdown_all();
                Ok(())
            },
        }
    }

    /// Accept connections forever, spawning a detached session worker for
    /// each. Accept failures affect only the connection being accepted.
    async fn accept_loop(&self) {
        let mut next_conn_id: u64 = 1;

        loop {
            match self.transport.accept().await {
                Ok((stream, addr)) => {
                    if self.directory.user_count() >= self.config.max_connections {
                        tracing::warn!(%addr, "connection rejected: server at capacity");
                        continue;
                    }

                    let conn_id = next_conn_id;
                    next_conn_id += 1;
                    tracing::debug!(conn_id, %addr, "connection accepted");

                    let directory = Arc::clone(&self.directory);
                    tokio::spawn(session::run_session(stream, conn_id, directory));
                },
                Err(error) => {
                    tracing::error!(%error, "accept failed");
                },
            }
        }
    }
}
