//! Server error types.

use thiserror::Error;

/// Errors that can occur in the server runtime.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error (invalid bind address).
    ///
    /// Fatal: prevents server startup. Fix configuration and restart.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport/network error (bind, accept or socket I/O failure).
    ///
    /// Fatal only at startup (bind). After startup, accept and per
    /// connection I/O failures end at most one connection and are logged,
    /// not propagated.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}
