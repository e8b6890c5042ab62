//! Display sink
//!
//! The chat window of the original system is an external collaborator
//! here: the core emits ordered event notifications through this trait
//! and never renders anything itself.

use std::net::SocketAddr;

/// Receives formatted event notifications from the relay core. Events
/// for one connection arrive in lifecycle order.
pub trait DisplaySink: Send + Sync {
    /// A client completed authentication and joined the chat.
    fn connected(&self, identity: &str, addr: &SocketAddr);

    /// A client left the chat (graceful close or connection error).
    fn disconnected(&self, identity: &str, addr: &SocketAddr);

    /// A chat message was received and is being fanned out.
    fn relayed(&self, identity: &str, addr: &SocketAddr, text: &str);

    /// An operator broadcast was fanned out. The operator sees their
    /// own message here, like anything else on the display.
    fn announced(&self, text: &str);

    /// A connection-level failure (send error, read error).
    fn error(&self, description: &str);
}

/// Default sink: forwards events to the `log` facade.
pub struct LogDisplay;

impl DisplaySink for LogDisplay {
    fn connected(&self, identity: &str, addr: &SocketAddr) {
        log::info!("{} conectado a {}", identity, addr);
    }

    fn disconnected(&self, identity: &str, addr: &SocketAddr) {
        log::info!("{} desconectado de {}", identity, addr);
    }

    fn relayed(&self, identity: &str, addr: &SocketAddr, text: &str) {
        log::info!("{}@{}: {}", identity, addr, text);
    }

    fn announced(&self, text: &str) {
        log::info!("Servidor: {}", text);
    }

    fn error(&self, description: &str) {
        log::warn!("{}", description);
    }
}
