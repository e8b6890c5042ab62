use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpListener;

use crate::auth::CredentialStore;
use crate::broadcast::BroadcastDispatcher;
use crate::config::RelayConfig;
use crate::display::DisplaySink;
use crate::error::StartupError;
use crate::server::worker::handle_connection;
use crate::session::SessionRegistry;

pub struct Server {
    listener: TcpListener,
    registry: Arc<SessionRegistry>,
    dispatcher: Arc<BroadcastDispatcher>,
    credentials: Arc<dyn CredentialStore>,
    display: Arc<dyn DisplaySink>,
    config: Arc<RelayConfig>,
    next_session_id: AtomicU64,
}

impl Server {
    /// Binds the listener on the configured address. A bind failure is
    /// fatal and aborts startup.
    pub async fn bind(
        config: RelayConfig,
        credentials: Arc<dyn CredentialStore>,
        display: Arc<dyn DisplaySink>,
    ) -> Result<Self, StartupError> {
        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| StartupError::Bind(addr.clone(), e))?;
        info!("Server bound to {}", addr);

        let registry = Arc::new(SessionRegistry::new());
        let dispatcher = Arc::new(BroadcastDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&display),
        ));

        Ok(Self {
            listener,
            registry,
            dispatcher,
            credentials,
            display,
            config: Arc::new(config),
            next_session_id: AtomicU64::new(0),
        })
    }

    /// Address the listener actually bound to (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared dispatcher handle for operator-originated broadcasts.
    pub fn dispatcher(&self) -> Arc<BroadcastDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Accepts connections until the process receives Ctrl-C, then
    /// tears the registry down so late admissions fail.
    pub async fn run(self) {
        info!("Chat relay listening on {}", self.config.listen_addr());

        tokio::select! {
            _ = self.accept_loop() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                self.registry.close().await;
            }
        }
    }

    async fn accept_loop(&self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
                    info!("New connection from {}", addr);

                    let registry = Arc::clone(&self.registry);
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let credentials = Arc::clone(&self.credentials);
                    let display = Arc::clone(&self.display);
                    let config = Arc::clone(&self.config);

                    // One task per connection so the accept loop never
                    // blocks on a client.
                    tokio::spawn(async move {
                        handle_connection(
                            stream,
                            addr,
                            id,
                            registry,
                            dispatcher,
                            credentials,
                            display,
                            config,
                        )
                        .await;
                    });
                }
                Err(e) => {
                    // Transient accept failures leave the listener up.
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}
