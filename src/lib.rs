pub mod auth;
pub mod broadcast;
pub mod config;
pub mod display;
pub mod error;
pub mod protocol;
pub mod server;
pub mod session;

pub use config::RelayConfig;
pub use server::Server;
