//! Chat relay server - entry point
//!
//! Authenticated multi-client chat over plain TCP: clients pass a
//! username/password handshake, then every message they send is fanned
//! out to all other connected clients. Lines typed on stdin are
//! broadcast to everyone as server announcements.

use env_logger;
use log::{error, info};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use chat_relay_server::auth::StaticCredentials;
use chat_relay_server::broadcast::BroadcastDispatcher;
use chat_relay_server::display::LogDisplay;
use chat_relay_server::{RelayConfig, Server};

#[tokio::main]
async fn main() {
    // env_logger picks up the RUST_LOG environment variable
    env_logger::init();

    let config = match RelayConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let credentials = Arc::new(StaticCredentials::default());
    let display = Arc::new(LogDisplay);

    let server = match Server::bind(config, credentials, display).await {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!("Launching chat relay server...");

    // Operator input: each stdin line becomes a broadcast to all
    // connected clients.
    tokio::spawn(operator_input(server.dispatcher()));

    server.run().await;
}

/// Reads operator lines from stdin and announces them to every session.
async fn operator_input(dispatcher: Arc<BroadcastDispatcher>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        dispatcher.announce(message).await;
    }
}
