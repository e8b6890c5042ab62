//! Session state
//!
//! One `Session` per accepted connection, owned exclusively by its
//! worker. The registry never holds the `Session` itself, only a
//! `SessionHandle` while the session is `Active`.

use std::net::SocketAddr;

/// Unique identifier for one accepted connection. Never reused.
pub type SessionId = u64;

/// Lifecycle of a connection. `Disconnected` is terminal; no session is
/// reused across connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Authenticating,
    Active,
    Disconnected,
}

/// State of one connected client.
pub struct Session {
    id: SessionId,
    addr: SocketAddr,
    username: Option<String>,
    state: SessionState,
}

impl Session {
    /// Creates a session at accept time, in the `Connecting` state.
    pub fn new(id: SessionId, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            username: None,
            state: SessionState::Connecting,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn addr(&self) -> &SocketAddr {
        &self.addr
    }

    /// Authenticated identity, set once the session becomes `Active`.
    pub fn username(&self) -> Option<&String> {
        self.username.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Marks the start of the handshake.
    pub fn begin_authentication(&mut self) {
        self.state = SessionState::Authenticating;
    }

    /// Records the authenticated identity and admits the session.
    /// The caller registers the matching handle at the same time.
    pub fn activate(&mut self, username: String) {
        self.username = Some(username);
        self.state = SessionState::Active;
    }

    /// Terminal transition. The caller removes the session from the
    /// registry before or immediately after this.
    pub fn disconnect(&mut self) {
        self.state = SessionState::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:54321".parse().unwrap()
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut session = Session::new(1, addr());
        assert_eq!(session.state(), SessionState::Connecting);
        assert!(session.username().is_none());

        session.begin_authentication();
        assert_eq!(session.state(), SessionState::Authenticating);

        session.activate("jonny".to_string());
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.username().unwrap(), "jonny");

        session.disconnect();
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_disconnect_during_authentication() {
        let mut session = Session::new(2, addr());
        session.begin_authentication();
        session.disconnect();
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.username().is_none());
    }
}
