//! Error types
//!
//! Defines domain-specific error types for each module of the relay
//! server. Startup errors are fatal; everything else is confined to the
//! connection that produced it.

use std::fmt;
use std::io;

/// Fatal errors raised before the listener starts accepting.
#[derive(Debug)]
pub enum StartupError {
    /// Missing or invalid configuration (e.g. no `server_ip` key).
    Config(config::ConfigError),
    /// The listen address could not be bound.
    Bind(String, io::Error),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Config(e) => write!(f, "Configuration error: {}", e),
            StartupError::Bind(addr, e) => write!(f, "Failed to bind to {}: {}", addr, e),
        }
    }
}

impl std::error::Error for StartupError {}

impl From<config::ConfigError> for StartupError {
    fn from(error: config::ConfigError) -> Self {
        StartupError::Config(error)
    }
}

/// Connection-level failures during the authentication handshake.
///
/// A credential mismatch is not an error: the handshake re-prompts and
/// never disconnects the client involuntarily. These variants cover the
/// cases where the handshake cannot continue.
#[derive(Debug)]
pub enum AuthError {
    /// The peer closed the connection before completing the handshake.
    Disconnected,
    /// The configured retry cap was reached without valid credentials.
    RetriesExhausted(u32),
    /// Read or write failure on the connection.
    Io(io::Error),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Disconnected => write!(f, "Client disconnected during authentication"),
            AuthError::RetriesExhausted(n) => {
                write!(f, "Authentication failed after {} attempts", n)
            }
            AuthError::Io(e) => write!(f, "I/O error during authentication: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<io::Error> for AuthError {
    fn from(error: io::Error) -> Self {
        AuthError::Io(error)
    }
}

/// Session registry errors.
#[derive(Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry has been torn down; no further sessions are admitted.
    Closed,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Closed => write!(f, "Session registry is closed"),
        }
    }
}

impl std::error::Error for RegistryError {}
