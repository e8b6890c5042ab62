//! End-to-end tests against a real server on an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

use chat_relay_server::auth::StaticCredentials;
use chat_relay_server::broadcast::BroadcastDispatcher;
use chat_relay_server::display::LogDisplay;
use chat_relay_server::{RelayConfig, Server};

const READ_DEADLINE: Duration = Duration::from_secs(2);
// How long to wait for activity that should never happen.
const SILENCE_WINDOW: Duration = Duration::from_millis(300);
// Registry admission happens just after the success notice is sent, so
// give the server a moment before relying on delivery.
const SETTLE: Duration = Duration::from_millis(200);

async fn start_server(max_auth_retries: Option<u32>) -> (SocketAddr, Arc<BroadcastDispatcher>) {
    let config = RelayConfig {
        server_ip: "127.0.0.1".to_string(),
        server_port: 0,
        max_auth_retries,
        io_timeout_secs: None,
        read_buffer_size: 1024,
    };
    let server = Server::bind(config, Arc::new(StaticCredentials::default()), Arc::new(LogDisplay))
        .await
        .expect("bind failed");
    let addr = server.local_addr().unwrap();
    let dispatcher = server.dispatcher();
    tokio::spawn(server.run());
    (addr, dispatcher)
}

struct TestClient {
    stream: TcpStream,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        Self {
            stream: TcpStream::connect(addr).await.unwrap(),
        }
    }

    fn local_addr(&self) -> SocketAddr {
        self.stream.local_addr().unwrap()
    }

    async fn send(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.unwrap();
    }

    /// Reads one chunk, as a real client of this unframed protocol does.
    async fn read_chunk(&mut self) -> String {
        let mut buf = [0u8; 1024];
        let n = timeout(READ_DEADLINE, self.stream.read(&mut buf))
            .await
            .expect("timed out waiting for data")
            .unwrap();
        String::from_utf8_lossy(&buf[..n]).to_string()
    }

    /// Accumulates reads until `needle` appears; consecutive server
    /// sends may coalesce into one TCP segment.
    async fn read_until(&mut self, needle: &str) -> String {
        let mut seen = String::new();
        while !seen.contains(needle) {
            let chunk = self.read_chunk().await;
            assert!(!chunk.is_empty(), "connection closed while waiting for {:?}", needle);
            seen.push_str(&chunk);
        }
        seen
    }

    /// Asserts that no data arrives within the silence window.
    async fn expect_silence(&mut self) {
        let mut buf = [0u8; 1024];
        match timeout(SILENCE_WINDOW, self.stream.read(&mut buf)).await {
            Err(_) => {}
            Ok(Ok(n)) => panic!(
                "expected silence, got {:?}",
                String::from_utf8_lossy(&buf[..n])
            ),
            Ok(Err(e)) => panic!("read failed while expecting silence: {}", e),
        }
    }

    /// Reads until the server closes the connection.
    async fn expect_close(&mut self) {
        let mut buf = [0u8; 1024];
        loop {
            match timeout(READ_DEADLINE, self.stream.read(&mut buf))
                .await
                .expect("timed out waiting for close")
            {
                Ok(0) => return,
                Ok(_) => continue,
                // A reset also counts as the server dropping us.
                Err(_) => return,
            }
        }
    }
}

async fn login(addr: SocketAddr, user: &str, pass: &str) -> TestClient {
    let mut client = TestClient::connect(addr).await;
    client.read_until("Get usuario:").await;
    client.send(user.as_bytes()).await;
    client.read_until("Get password:").await;
    client.send(pass.as_bytes()).await;
    client.read_until("Autenticacion exitosa").await;
    client
}

#[tokio::test]
async fn test_relay_reaches_others_never_sender() {
    let (addr, _) = start_server(None).await;

    let mut a = login(addr, "jonny", "jonnyl").await;
    let mut b = login(addr, "edwin", "edwinm").await;
    sleep(SETTLE).await;

    a.send(b"hola").await;

    let expected = format!("jonny@{}: hola", a.local_addr());
    assert_eq!(b.read_chunk().await, expected);
    a.expect_silence().await;
}

#[tokio::test]
async fn test_invalid_credentials_reprompted_and_not_admitted() {
    let (addr, _) = start_server(None).await;

    let mut mallory = TestClient::connect(addr).await;
    mallory.read_until("Get usuario:").await;
    mallory.send(b"mallory").await;
    mallory.read_until("Get password:").await;
    mallory.send(b"anything").await;

    // Failure notice, then the handshake restarts at the username
    // prompt. The client is never disconnected over bad credentials.
    let seen = mallory.read_until("Get usuario:").await;
    assert!(seen.contains("Usuario o clave invalida. Intente nuevamente."));

    // Chat traffic must not reach the unauthenticated connection.
    let mut a = login(addr, "jonny", "jonnyl").await;
    let mut b = login(addr, "edwin", "edwinm").await;
    sleep(SETTLE).await;
    a.send(b"secreto").await;
    b.read_until("secreto").await;
    mallory.expect_silence().await;
}

#[tokio::test]
async fn test_retry_cap_drops_connection() {
    let (addr, _) = start_server(Some(1)).await;

    let mut client = TestClient::connect(addr).await;
    client.read_until("Get usuario:").await;
    client.send(b"jonny").await;
    client.read_until("Get password:").await;
    client.send(b"wrong").await;

    // The failure notice still goes out before the drop.
    client.read_until("Usuario o clave invalida").await;
    client.expect_close().await;
}

#[tokio::test]
async fn test_abrupt_disconnect_does_not_affect_others() {
    let (addr, _) = start_server(None).await;

    let a = login(addr, "jonny", "jonnyl").await;
    let mut b = login(addr, "edwin", "edwinm").await;
    let mut c = login(addr, "alberto", "albertov").await;
    sleep(SETTLE).await;

    // A drops mid-session without any goodbye.
    drop(a);
    sleep(SETTLE).await;

    c.send(b"ping").await;
    let expected = format!("alberto@{}: ping", c.local_addr());
    assert_eq!(b.read_chunk().await, expected);
}

#[tokio::test]
async fn test_announce_reaches_all_sessions() {
    let (addr, dispatcher) = start_server(None).await;

    let mut a = login(addr, "jonny", "jonnyl").await;
    let mut b = login(addr, "edwin", "edwinm").await;
    sleep(SETTLE).await;

    dispatcher.announce("mantenimiento en 5 minutos").await;

    assert_eq!(a.read_chunk().await, "Servidor: mantenimiento en 5 minutos");
    assert_eq!(b.read_chunk().await, "Servidor: mantenimiento en 5 minutos");
}

#[tokio::test]
async fn test_failed_recipient_does_not_block_delivery() {
    let (addr, _) = start_server(None).await;

    let mut a = login(addr, "jonny", "jonnyl").await;
    let b = login(addr, "edwin", "edwinm").await;
    let mut c = login(addr, "alberto", "albertov").await;
    sleep(SETTLE).await;

    // B's socket dies; the registry entry may briefly linger, so the
    // dispatcher can hit a send failure on it mid-broadcast.
    drop(b);

    a.send(b"uno").await;
    c.read_until("uno").await;

    a.send(b"dos").await;
    let expected = format!("jonny@{}: dos", a.local_addr());
    c.read_until(&expected).await;
}

#[tokio::test]
async fn test_second_session_same_identity_is_permitted() {
    let (addr, _) = start_server(None).await;

    let mut first = login(addr, "jonny", "jonnyl").await;
    let mut second = login(addr, "jonny", "jonnyl").await;
    sleep(SETTLE).await;

    first.send(b"hola yo").await;
    let expected = format!("jonny@{}: hola yo", first.local_addr());
    assert_eq!(second.read_chunk().await, expected);
    first.expect_silence().await;
}
