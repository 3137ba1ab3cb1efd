//! Startup failure taxonomy.

use std::net::SocketAddr;

use thiserror::Error;

/// Fatal startup failures.
///
/// Each class exits with its own code so a service wrapper can tell a bad
/// configuration from an occupied port. Once the listener is up, nothing
/// maps back to these: runtime errors never terminate the process.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(anyhow::Error),

    #[error("cannot initialize logging: {0}")]
    Logger(anyhow::Error),

    #[error("cannot daemonize: {0}")]
    Daemonize(anyhow::Error),

    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("cannot start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl StartupError {
    /// Process exit code for this failure class.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Logger(_) => 3,
            Self::Daemonize(_) => 4,
            Self::Bind { .. } => 5,
            Self::Runtime(_) => 6,
        }
    }
}
