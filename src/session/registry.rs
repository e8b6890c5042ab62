//! Session registry
//!
//! Concurrency-safe collection of the sessions currently admitted to the
//! chat. All mutation happens under one mutex; broadcast callers take a
//! `snapshot` and release the lock before performing any socket I/O, so
//! a slow or stalled peer never serializes the registry.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

use crate::error::RegistryError;
use crate::session::SessionId;

/// The registry's view of one active session: identity, address, and the
/// write half of its socket. Cloning is cheap; all clones share the same
/// writer, serialized by its own mutex so concurrent broadcasts never
/// interleave bytes on one connection.
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    username: String,
    addr: SocketAddr,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl SessionHandle {
    pub fn new(id: SessionId, username: String, addr: SocketAddr, writer: OwnedWriteHalf) -> Self {
        Self {
            id,
            username,
            addr,
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn addr(&self) -> &SocketAddr {
        &self.addr
    }

    /// Writes one message to this session's socket.
    pub async fn send(&self, payload: &[u8]) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(payload).await?;
        writer.flush().await
    }
}

#[derive(Default)]
struct RegistryInner {
    sessions: Vec<SessionHandle>,
    closed: bool,
}

/// Insertion-ordered set of active sessions, keyed by session id.
///
/// Invariant: a session appears here iff its state is `Active`. The
/// owning worker inserts its handle on activation and removes it on
/// disconnect.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<RegistryInner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a session. Fails only once the registry has been torn
    /// down at shutdown.
    pub async fn add(&self, handle: SessionHandle) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(RegistryError::Closed);
        }
        inner.sessions.push(handle);
        Ok(())
    }

    /// Removes a session by id. Removing an absent id is a no-op, which
    /// makes double-disconnect races harmless.
    pub async fn remove(&self, id: SessionId) {
        let mut inner = self.inner.lock().await;
        inner.sessions.retain(|s| s.id() != id);
    }

    /// Point-in-time copy of the active sessions in insertion order,
    /// optionally excluding one (the sender, for relay semantics).
    ///
    /// The registry lock is released when this returns; callers perform
    /// all socket I/O on the snapshot without holding it.
    pub async fn snapshot(&self, excluding: Option<SessionId>) -> Vec<SessionHandle> {
        let inner = self.inner.lock().await;
        inner
            .sessions
            .iter()
            .filter(|s| excluding != Some(s.id()))
            .cloned()
            .collect()
    }

    /// Number of active sessions.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.sessions.is_empty()
    }

    /// Tears the registry down: drops all handles and rejects further
    /// `add` calls. Called once at shutdown.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        inner.closed = true;
        inner.sessions.clear();
    }
}
