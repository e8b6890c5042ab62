//! Connection worker
//!
//! Drives one connection through its lifecycle: handshake, registry
//! admission, relay loop, removal. All socket blocking is confined to
//! this task; failures here never reach other sessions or the listener.

use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::time::timeout;

use crate::auth::{AuthHandshake, CredentialStore};
use crate::broadcast::BroadcastDispatcher;
use crate::config::RelayConfig;
use crate::display::DisplaySink;
use crate::error::AuthError;
use crate::session::{Session, SessionHandle, SessionId, SessionRegistry};

/// Runs one connection to completion.
#[allow(clippy::too_many_arguments)]
pub async fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    id: SessionId,
    registry: Arc<SessionRegistry>,
    dispatcher: Arc<BroadcastDispatcher>,
    credentials: Arc<dyn CredentialStore>,
    display: Arc<dyn DisplaySink>,
    config: Arc<RelayConfig>,
) {
    let mut session = Session::new(id, addr);
    session.begin_authentication();

    let handshake = AuthHandshake::new(
        credentials.as_ref(),
        config.max_auth_retries,
        config.io_timeout(),
        config.read_buffer_size,
    );

    let username = match handshake.authenticate(&mut stream).await {
        Ok(username) => username,
        Err(AuthError::Disconnected) => {
            info!("Client {} disconnected during authentication", addr);
            session.disconnect();
            return;
        }
        Err(e) => {
            display.error(&format!("Authentication aborted for {}: {}", addr, e));
            session.disconnect();
            return;
        }
    };

    let (mut read_half, write_half) = stream.into_split();
    let handle = SessionHandle::new(id, username.clone(), addr, write_half);

    if let Err(e) = registry.add(handle.clone()).await {
        warn!("Could not admit {} ({}): {}", username, addr, e);
        session.disconnect();
        return;
    }
    session.activate(username.clone());
    display.connected(&username, &addr);

    let mut buf = vec![0u8; config.read_buffer_size];
    loop {
        match read_chunk(&mut read_half, &mut buf, config.io_timeout()).await {
            // Zero-byte read: graceful close. The client-side "quit"
            // closes its own socket and lands here too.
            Ok(0) => break,
            Ok(n) => {
                let text = String::from_utf8_lossy(&buf[..n]).to_string();
                display.relayed(&username, &addr, &text);
                dispatcher.relay(&handle, &text).await;
            }
            Err(e) => {
                display.error(&format!("Error on connection {}@{}: {}", username, addr, e));
                break;
            }
        }
    }

    registry.remove(id).await;
    session.disconnect();
    display.disconnected(&username, &addr);
    info!("Client {}@{} disconnected", username, addr);
}

/// Reads up to the cap, honoring the optional per-read deadline.
/// Messages larger than the cap or split across packets are not
/// reassembled; each chunk relays as its own message.
async fn read_chunk(
    reader: &mut OwnedReadHalf,
    buf: &mut [u8],
    deadline: Option<Duration>,
) -> std::io::Result<usize> {
    match deadline {
        Some(deadline) => match timeout(deadline, reader.read(buf)).await {
            Ok(result) => result,
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "read deadline elapsed",
            )),
        },
        None => reader.read(buf).await,
    }
}
